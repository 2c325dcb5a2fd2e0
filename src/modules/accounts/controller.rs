use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use chrono::{Duration, Utc};
use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

use super::{
    crud::AccountCrud,
    interface::{AccountError, Result},
    model::{Account, Role, TokenPurpose},
    schema::{
        normalize_phone, ChangePasswordRequest, ForgotPasswordRequest, LoginRequest, LoginResponse, NewAccount,
        RefreshTokenRequest, RefreshTokenResponse, RegisterRequest, RegisterResponse, RegisterSupplierRequest,
        RegisterSupplierResponse, ResetPasswordRequest, UpdateProfileRequest, UserResponse, VerifyEmailQuery,
    },
};
use crate::services::auth::AuthUser;
use crate::services::hashing;
use crate::services::notify::{self, email_best_effort};
use crate::services::response::MessageResponse;
use crate::AppState;

const TOKEN_TTL_HOURS: i64 = 24;

fn check_new_password(password: &str, confirm: &str) -> Result<()> {
    if password != confirm {
        return Err(AccountError::PasswordMismatch);
    }
    if let Some(reason) = hashing::password_weakness(password) {
        return Err(AccountError::WeakPassword(reason));
    }
    Ok(())
}

async fn create_account(
    state: &AppState,
    new: NewAccount<'_>,
    role: Role,
    company_name: Option<&str>,
) -> Result<(Account, Option<i64>)> {
    check_new_password(new.password, new.password_confirm)?;

    let email = new.email.trim().to_lowercase();
    let phone = normalize_phone(new.phone);
    let crud = AccountCrud::new(state.db.clone());

    if crud.email_exists(&email).await? {
        return Err(AccountError::EmailTaken);
    }
    if crud.phone_exists(&phone).await? {
        return Err(AccountError::PhoneTaken);
    }

    let now = Utc::now();
    let account = Account {
        id: Uuid::new_v4().to_string(),
        email,
        phone,
        first_name: new.first_name.trim().to_string(),
        last_name: new.last_name.trim().to_string(),
        city: None,
        street: None,
        house: None,
        flat: None,
        index: None,
        role,
        is_staff: false,
        is_active: true,
        is_email_verified: false,
        password_hash: hashing::hash_password(new.password)?,
        created_at: now,
        updated_at: now,
    };

    let company_id = crud.create(&account, company_name).await.map_err(|e| {
        // lost a race with a concurrent registration
        let duplicate = e
            .as_database_error()
            .filter(|db| db.is_unique_violation())
            .map(|db| db.message().contains("phone"));
        match duplicate {
            Some(true) => AccountError::PhoneTaken,
            Some(false) => AccountError::EmailTaken,
            None => AccountError::Database(e),
        }
    })?;

    tracing::info!(account_id = %account.id, role = role.as_str(), "account registered");
    state.metrics.record_registration(role.as_str());

    send_verification(state, &crud, &account).await?;
    Ok((account, company_id))
}

async fn send_verification(state: &AppState, crud: &AccountCrud, account: &Account) -> Result<()> {
    let token = crud
        .issue_token(&account.id, TokenPurpose::EmailVerification, Duration::hours(TOKEN_TTL_HOURS))
        .await?;
    let message = notify::verification_email(&account.first_name, &state.config.frontend_url, &token);
    email_best_effort(state.notifier.as_ref(), &state.metrics, &account.email, &message).await;
    Ok(())
}

async fn load_account(state: &AppState, id: &str) -> Result<Account> {
    AccountCrud::new(state.db.clone())
        .find_by_id(id)
        .await?
        .ok_or(AccountError::NotFound)
}

// =============================================================================
// REGISTRATION
// =============================================================================

pub async fn register(
    State(state): State<Arc<AppState>>,
    Json(req): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<RegisterResponse>)> {
    req.validate()?;

    let (account, _) = create_account(&state, req.new_account(), Role::Buyer, None).await?;

    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            message: "Registration successful. Check your email to confirm your address.",
            user: account.into(),
        }),
    ))
}

pub async fn register_supplier(
    State(state): State<Arc<AppState>>,
    Json(req): Json<RegisterSupplierRequest>,
) -> Result<(StatusCode, Json<RegisterSupplierResponse>)> {
    req.validate()?;

    let company_name = req.name_company.trim();
    let (account, company_id) =
        create_account(&state, req.new_account(), Role::Supplier, Some(company_name)).await?;

    Ok((
        StatusCode::CREATED,
        Json(RegisterSupplierResponse {
            message: "Supplier registration successful. Check your email to confirm your address.",
            user_id: account.id,
            company_id: company_id.unwrap_or_default(),
        }),
    ))
}

// =============================================================================
// LOGIN / TOKENS
// =============================================================================

pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<LoginResponse>> {
    let crud = AccountCrud::new(state.db.clone());
    let identifier = req.email_or_phone.trim();

    let account = if identifier.contains('@') {
        crud.find_by_email(&identifier.to_lowercase()).await?
    } else {
        crud.find_by_phone(&normalize_phone(identifier)).await?
    }
    .ok_or(AccountError::InvalidCredentials)?;

    if !hashing::verify_password(&req.password, &account.password_hash)? {
        return Err(AccountError::InvalidCredentials);
    }
    if !account.is_active {
        return Err(AccountError::AccountDisabled);
    }

    let pair = state.jwt_service.issue_pair(&account.id, &account.email)?;
    tracing::debug!(account_id = %account.id, "login succeeded");

    Ok(Json(LoginResponse {
        user: account.into(),
        access_token: pair.access_token,
        refresh_token: pair.refresh_token,
        token_type: "Bearer",
        expires_in: pair.expires_in,
    }))
}

pub async fn refresh_token(
    State(state): State<Arc<AppState>>,
    Json(req): Json<RefreshTokenRequest>,
) -> Result<Json<RefreshTokenResponse>> {
    let claims = state
        .jwt_service
        .verify_refresh_token(&req.refresh_token)
        .map_err(|_| AccountError::InvalidRefreshToken)?;

    let account = AccountCrud::new(state.db.clone())
        .find_by_id(&claims.sub)
        .await?
        .filter(|a| a.is_active)
        .ok_or(AccountError::InvalidRefreshToken)?;

    let pair = state.jwt_service.issue_pair(&account.id, &account.email)?;

    Ok(Json(RefreshTokenResponse {
        access_token: pair.access_token,
        refresh_token: pair.refresh_token,
        token_type: "Bearer",
        expires_in: pair.expires_in,
    }))
}

// =============================================================================
// PROFILE
// =============================================================================

pub async fn get_user(State(state): State<Arc<AppState>>, user: AuthUser) -> Result<Json<UserResponse>> {
    let account = load_account(&state, &user.id).await?;
    Ok(Json(account.into()))
}

pub async fn update_user(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Json(req): Json<UpdateProfileRequest>,
) -> Result<Json<UserResponse>> {
    req.validate()?;

    AccountCrud::new(state.db.clone()).update_profile(&user.id, &req).await?;
    let account = load_account(&state, &user.id).await?;
    Ok(Json(account.into()))
}

// =============================================================================
// EMAIL VERIFICATION
// =============================================================================

pub async fn verify_email(
    State(state): State<Arc<AppState>>,
    Query(query): Query<VerifyEmailQuery>,
) -> Result<Json<MessageResponse>> {
    let raw = query
        .token
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or(AccountError::InvalidToken)?;

    let crud = AccountCrud::new(state.db.clone());
    let token = crud
        .find_token(TokenPurpose::EmailVerification, raw)
        .await?
        .filter(|t| t.is_redeemable(Utc::now()))
        .ok_or(AccountError::InvalidToken)?;

    if !crud.confirm_email(&token).await? {
        return Err(AccountError::InvalidToken);
    }
    tracing::info!(account_id = %token.account_id, "email verified");

    Ok(Json(MessageResponse::new("Email successfully verified")))
}

pub async fn resend_verification(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
) -> Result<Json<MessageResponse>> {
    let account = load_account(&state, &user.id).await?;
    if account.is_email_verified {
        return Err(AccountError::AlreadyVerified);
    }

    send_verification(&state, &AccountCrud::new(state.db.clone()), &account).await?;
    Ok(Json(MessageResponse::new("Verification email sent")))
}

// =============================================================================
// PASSWORDS
// =============================================================================

pub async fn forgot_password(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ForgotPasswordRequest>,
) -> Result<Json<MessageResponse>> {
    req.validate()?;

    let crud = AccountCrud::new(state.db.clone());
    let account = crud
        .find_by_email(&req.email.trim().to_lowercase())
        .await?
        .ok_or(AccountError::UnknownEmail)?;

    let token = crud
        .issue_token(&account.id, TokenPurpose::PasswordReset, Duration::hours(TOKEN_TTL_HOURS))
        .await?;
    let message = notify::password_reset_email(&account.first_name, &state.config.frontend_url, &token);
    email_best_effort(state.notifier.as_ref(), &state.metrics, &account.email, &message).await;

    Ok(Json(MessageResponse::new("Password reset instructions have been sent to your email")))
}

pub async fn reset_password(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ResetPasswordRequest>,
) -> Result<Json<MessageResponse>> {
    let crud = AccountCrud::new(state.db.clone());
    let token = crud
        .find_token(TokenPurpose::PasswordReset, req.token.trim())
        .await?
        .filter(|t| t.is_redeemable(Utc::now()))
        .ok_or(AccountError::InvalidToken)?;

    check_new_password(&req.new_password, &req.new_password_confirm)?;

    let password_hash = hashing::hash_password(&req.new_password)?;
    if !crud.complete_reset(&token, &password_hash).await? {
        return Err(AccountError::InvalidToken);
    }
    tracing::info!(account_id = %token.account_id, "password reset");

    Ok(Json(MessageResponse::new("Password has been reset")))
}

pub async fn change_password(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Json(req): Json<ChangePasswordRequest>,
) -> Result<Json<MessageResponse>> {
    let account = load_account(&state, &user.id).await?;

    if !hashing::verify_password(&req.old_password, &account.password_hash)? {
        return Err(AccountError::WrongPassword);
    }
    check_new_password(&req.new_password, &req.new_password_confirm)?;

    let password_hash = hashing::hash_password(&req.new_password)?;
    AccountCrud::new(state.db.clone())
        .update_password(&account.id, &password_hash)
        .await?;

    Ok(Json(MessageResponse::new("Password has been changed")))
}
