use crate::auth::authenticate;
use crate::config::Config;
use crate::error::{AdminError, StoreError};
use crate::types::{GrantResponse, InviteRequest, Role, RoleAssignment, Stage};
use crate::AppState;

/// Accept an Origin header only in `http(s)://host[:port]` form.
pub fn valid_origin(origin: &str) -> Option<&str> {
    let origin = origin.trim().trim_end_matches('/');
    let authority = origin
        .strip_prefix("https://")
        .or_else(|| origin.strip_prefix("http://"))?;

    let (host, port) = match authority.split_once(':') {
        Some((host, port)) => (host, Some(port)),
        None => (authority, None),
    };

    let host_ok = !host.is_empty()
        && !host.starts_with(['.', '-'])
        && host
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '.' || c == '-');
    let port_ok = match port {
        Some(port) => {
            !port.is_empty() && port.len() <= 5 && port.chars().all(|c| c.is_ascii_digit())
        }
        None => true,
    };

    if host_ok && port_ok {
        Some(origin)
    } else {
        None
    }
}

/// Build the link the invitation mail points at: the caller's Origin if it
/// is a plain `http(s)://host[:port]`, otherwise the configured site URL.
pub fn redirect_url(origin: Option<&str>, config: &Config) -> String {
    let base = match origin {
        Some(raw) => match valid_origin(raw) {
            Some(origin) => origin,
            None => {
                if !raw.trim().is_empty() {
                    tracing::warn!("Ignoring unusable Origin header {:?}", raw);
                }
                config.site_url.as_str()
            }
        },
        None => config.site_url.as_str(),
    }
    .trim_end_matches('/');

    let path = config.invite_redirect_path.trim_start_matches('/');
    if path.is_empty() {
        base.to_string()
    } else {
        format!("{}/{}", base, path)
    }
}

/// Grant `role` to the account behind `email`, inviting it first if needed.
///
/// Only admins may invite. A user that already holds any role is left alone.
pub async fn invite_user(
    state: &AppState,
    authorization: Option<&str>,
    origin: Option<&str>,
    body: impl AsRef<[u8]>,
) -> Result<GrantResponse, AdminError> {
    tracing::info!(stage = %Stage::Authenticating, "Invite requested");
    let caller = authenticate(state.identity.as_ref(), authorization).await?;

    tracing::info!(stage = %Stage::Validating, caller = %caller.id, "Validating invite body");
    let body = std::str::from_utf8(body.as_ref()).map_err(|e| {
        tracing::warn!("Invite body is not UTF-8: {}", e);
        AdminError::InvalidInput("Request body is not valid UTF-8".to_string())
    })?;
    let request: InviteRequest = if body.trim().is_empty() {
        InviteRequest::default()
    } else {
        serde_json::from_str(body).map_err(|e| {
            tracing::warn!("Failed to parse invite body: {}", e);
            AdminError::InvalidInput(format!("Invalid request body: {}", e))
        })?
    };
    let invite = request.validate()?;

    tracing::info!(stage = %Stage::Authorizing, caller = %caller.id, "Checking caller role");
    let caller_role = state.roles.get_role(&caller.id).await.map_err(|e| {
        tracing::error!("Failed to look up caller role: {:?}", e);
        AdminError::from(e)
    })?;
    if caller_role != Some(Role::Admin) {
        tracing::warn!(caller = %caller.id, "Invite refused: caller is not an admin");
        return Err(AdminError::Forbidden(
            "Only admins can invite users".to_string(),
        ));
    }

    tracing::info!(stage = %Stage::Resolving, email = %invite.email, "Looking up invitee");
    let existing = state
        .identity
        .find_user_by_email(&invite.email)
        .await
        .map_err(|e| {
            tracing::error!("Failed to look up user by email: {:?}", e);
            AdminError::from(e)
        })?;

    let (user_id, invited) = match existing {
        Some(user_id) => {
            let current = state.roles.get_role(&user_id).await.map_err(|e| {
                tracing::error!("Failed to look up invitee role: {:?}", e);
                AdminError::from(e)
            })?;
            if let Some(current) = current {
                tracing::warn!(user_id = %user_id, role = %current, "Invitee already has a role");
                return Err(AdminError::DuplicateRole);
            }
            (user_id, false)
        }
        None => {
            tracing::info!(stage = %Stage::Mutating, email = %invite.email, "Sending invitation");
            let redirect = redirect_url(origin, &state.config);
            let user_id = state
                .identity
                .invite_user_by_email(&invite.email, &redirect)
                .await
                .map_err(|e| {
                    tracing::error!("Failed to invite {}: {:?}", invite.email, e);
                    AdminError::from(e)
                })?;
            (user_id, true)
        }
    };

    tracing::info!(stage = %Stage::Mutating, user_id = %user_id, role = %invite.role, "Assigning role");
    let assignment = RoleAssignment::new(user_id.clone(), invite.role);
    match state.roles.insert_role(&assignment).await {
        Ok(()) => {}
        Err(StoreError::Conflict) => {
            tracing::warn!(user_id = %user_id, "Role assigned concurrently by another request");
            return Err(AdminError::DuplicateRole);
        }
        Err(e) => {
            tracing::error!("Failed to insert role: {:?}", e);
            return Err(e.into());
        }
    }

    let message = if invited {
        format!("Invitation sent to {}", invite.email)
    } else {
        format!(
            "Role '{}' assigned to existing user {}",
            invite.role, invite.email
        )
    };

    tracing::info!(stage = %Stage::Completed, user_id = %user_id, "{}", message);
    Ok(GrantResponse::new(message, user_id))
}
