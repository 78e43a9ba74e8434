//! `auth:login`, `auth:signup`, `auth:logout`.
//!
//! Authentication here is a same-process credential match against the
//! simulated user table, in plaintext. That is deliberate: the interpreter
//! previews an app that does not exist yet, so the only requirement is
//! demo fidelity. None of this is a template for real credential handling,
//! and the behavior must not be "hardened" — behavior parity with the
//! declarative platform is the contract.

use async_trait::async_trait;
use serde_json::Value;

use crate::dispatch::{ActionContext, ActionHandler};
use crate::error::{CoreError, CoreResult};
use crate::handlers::parse_payload;
use crate::state::build_record;
use crate::types::{kind, AppDocument, AuthConfig, LoginAction, LogoutAction, SignupAction};

/// The screen to land on after a successful login/signup.
fn post_login_target(document: &AppDocument, auth: &AuthConfig) -> Option<String> {
    auth.post_login_screen
        .clone()
        .or_else(|| document.initial_screen_id().map(str::to_string))
}

/// Match submitted credentials against the configured user table.
pub struct LoginHandler;

#[async_trait]
impl ActionHandler for LoginHandler {
    async fn handle(&self, action: &Value, ctx: &ActionContext) -> CoreResult<()> {
        let payload: LoginAction = parse_payload(kind::AUTH_LOGIN, action)?;
        let Some(document) = ctx.document.as_deref() else {
            return Ok(());
        };
        let Some(auth) = document.auth.as_ref() else {
            return Ok(());
        };

        let form = ctx.form.snapshot().await;
        let email_field_id = payload.fields.get("email").map_or("email", String::as_str);
        let password_field_id = payload
            .fields
            .get("password")
            .map_or("password", String::as_str);
        let submitted_email = form.get(email_field_id);
        let submitted_password = form.get(password_field_id);

        let tables = ctx.store.snapshot().await;
        let matched = match (submitted_email, submitted_password) {
            (Some(email), Some(password)) => tables
                .records(&auth.user_table)
                .iter()
                .find(|record| {
                    record.get(&auth.email_field) == Some(email)
                        && record.get(&auth.password_field) == Some(password)
                })
                .cloned(),
            _ => None,
        };

        match matched {
            Some(user) => {
                ctx.session.sign_in(user).await;
                if let Some(target) = post_login_target(document, auth) {
                    ctx.navigation.navigate(target).await;
                }
                ctx.form.clear().await;
                Ok(())
            }
            None => match payload.on_error.as_ref() {
                Some(on_error) => {
                    log::warn!("login rejected: no matching user in '{}'", auth.user_table);
                    ctx.dispatch(on_error).await;
                    Ok(())
                }
                None => Err(CoreError::InvalidCredentials),
            },
        }
    }
}

/// Create a user record and start a session, unless the email is taken.
pub struct SignupHandler;

#[async_trait]
impl ActionHandler for SignupHandler {
    async fn handle(&self, action: &Value, ctx: &ActionContext) -> CoreResult<()> {
        let payload: SignupAction = parse_payload(kind::AUTH_SIGNUP, action)?;
        let Some(document) = ctx.document.as_deref() else {
            return Ok(());
        };
        let Some(auth) = document.auth.as_ref() else {
            return Ok(());
        };

        let form = ctx.form.snapshot().await;
        let email_field_id = payload.fields.get("email").map_or("email", String::as_str);
        let submitted_email = form.get(email_field_id);

        let mut tables = ctx.store.snapshot().await;
        let taken = submitted_email.is_some_and(|email| {
            tables
                .records(&auth.user_table)
                .iter()
                .any(|record| record.get(&auth.email_field) == Some(email))
        });
        if taken {
            match payload.on_error.as_ref() {
                Some(on_error) => {
                    log::warn!("signup rejected: email already registered");
                    ctx.dispatch(on_error).await;
                    return Ok(());
                }
                None => {
                    let email = submitted_email
                        .and_then(Value::as_str)
                        .unwrap_or_default()
                        .to_string();
                    return Err(CoreError::DuplicateUser(email));
                }
            }
        }

        let user = build_record(
            document.database.as_ref(),
            &auth.user_table,
            payload.fields.iter().filter_map(|(field, form_field_id)| {
                form.get(form_field_id)
                    .map(|value| (field.clone(), value.clone()))
            }),
        );

        tables.append_record(&auth.user_table, user.clone());
        ctx.store.replace(tables).await;

        ctx.session.sign_in(user).await;
        if let Some(target) = post_login_target(document, auth) {
            ctx.navigation.navigate(target).await;
        }
        ctx.form.clear().await;
        Ok(())
    }
}

/// Always clear the session; then run `onSuccess`, or fall back to the
/// document's initial screen.
pub struct LogoutHandler;

#[async_trait]
impl ActionHandler for LogoutHandler {
    async fn handle(&self, action: &Value, ctx: &ActionContext) -> CoreResult<()> {
        let payload: LogoutAction = parse_payload(kind::AUTH_LOGOUT, action)?;
        ctx.session.clear().await;

        if let Some(on_success) = payload.on_success.as_ref() {
            ctx.dispatch(on_success).await;
        } else if let Some(initial) = ctx
            .document
            .as_deref()
            .and_then(AppDocument::initial_screen_id)
        {
            ctx.navigation.navigate(initial).await;
        }
        Ok(())
    }
}
