//! Account settings: profile fields, avatar, password and sign out

use super::{AppContext, Loadable, Route, ScreenScope, SubmitState};
use crate::error::Result;
use crate::models::{PasswordChange, ProfileUpdate, Upload, User};

const SETTINGS_LOGIN: &str = "You must be logged in to access profile settings";
const LOAD_FAILED: &str = "Failed to load your profile. Please try again later.";
const UPDATE_FAILED: &str = "Failed to update profile. Please try again.";
const PASSWORD_FAILED: &str = "Failed to update password. Please try again.";

pub const MIN_PASSWORD_LEN: usize = 8;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PasswordForm {
    pub current_password: String,
    pub new_password: String,
    pub confirm_password: String,
}

impl PasswordForm {
    fn validate(&self) -> Option<&'static str> {
        if self.current_password.is_empty() {
            Some("Current password is required")
        } else if self.new_password.chars().count() < MIN_PASSWORD_LEN {
            Some("Password must be at least 8 characters")
        } else if self.new_password != self.confirm_password {
            Some("Passwords do not match")
        } else {
            None
        }
    }
}

/// Loose shape check: something@domain.tld, no spaces
fn is_valid_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !email.contains(char::is_whitespace)
        && !domain.contains('@')
        && domain
            .split_once('.')
            .map(|(host, tld)| !host.is_empty() && !tld.is_empty() && !tld.ends_with('.'))
            .unwrap_or(false)
}

fn validate_profile(form: &ProfileUpdate) -> Option<&'static str> {
    let email = form.email.trim();
    if form.username.trim().is_empty() {
        Some("Username is required")
    } else if email.is_empty() {
        Some("Email is required")
    } else if !is_valid_email(email) {
        Some("Invalid email address")
    } else {
        None
    }
}

pub struct SettingsScreen {
    ctx: AppContext,
    scope: ScreenScope,
    pub user: Loadable<User>,
    pub profile_form: ProfileUpdate,
    pub password_form: PasswordForm,
    pub submit: SubmitState,
}

impl SettingsScreen {
    pub fn new(ctx: AppContext) -> Self {
        Self {
            ctx,
            scope: ScreenScope::new(),
            user: Loadable::Loading,
            profile_form: ProfileUpdate::default(),
            password_form: PasswordForm::default(),
            submit: SubmitState::Idle,
        }
    }

    pub fn scope(&self) -> &ScreenScope {
        &self.scope
    }

    /// Auth gate, then fill the profile form from `/api/users/me`
    pub async fn mount(&mut self) -> Result<()> {
        self.ctx.require_session(SETTINGS_LOGIN)?;
        self.user = Loadable::Loading;
        let session = self.ctx.session.clone();

        match self.scope.run(session.current_user()).await {
            Ok(Some(user)) => {
                self.profile_form = ProfileUpdate::from_user(&user);
                self.user = Loadable::Ready(user);
                Ok(())
            }
            Ok(None) => {
                // Signed out while loading
                self.ctx.require_session(SETTINGS_LOGIN).map(|_| ())
            }
            Err(e) if e.is_cancelled() => Err(e),
            Err(e) => {
                self.user = Loadable::Failed(LOAD_FAILED.to_string());
                Err(self.ctx.report_fixed(e, LOAD_FAILED))
            }
        }
    }

    /// Save the profile form, optionally with a new avatar image
    pub async fn update_profile(&mut self, avatar: Option<Upload>) -> Result<User> {
        let token = self.ctx.require_session(SETTINGS_LOGIN)?;
        if let Some(message) = validate_profile(&self.profile_form) {
            return Err(self.ctx.reject(message));
        }

        let mut form = self.profile_form.clone();
        form.username = form.username.trim().to_string();
        form.email = form.email.trim().to_string();

        self.submit = SubmitState::Submitting;
        let result = self
            .scope
            .run(self.ctx.api.update_me(&token, &form, avatar.as_ref()))
            .await;
        self.submit = SubmitState::Idle;

        match result {
            Ok(user) => {
                self.ctx.session.set_user(user.clone());
                self.profile_form = ProfileUpdate::from_user(&user);
                self.user = Loadable::Ready(user.clone());
                self.ctx.notifier.success("Profile updated successfully!");
                Ok(user)
            }
            Err(e) => Err(self.ctx.report(e, UPDATE_FAILED)),
        }
    }

    pub async fn change_password(&mut self) -> Result<()> {
        let token = self.ctx.require_session(SETTINGS_LOGIN)?;
        if let Some(message) = self.password_form.validate() {
            return Err(self.ctx.reject(message));
        }

        let change = PasswordChange {
            current_password: self.password_form.current_password.clone(),
            new_password: self.password_form.new_password.clone(),
        };
        self.submit = SubmitState::Submitting;
        let result = self
            .scope
            .run(self.ctx.api.change_password(&token, &change))
            .await;
        self.submit = SubmitState::Idle;

        match result {
            Ok(()) => {
                self.password_form = PasswordForm::default();
                self.ctx.notifier.success("Password updated successfully!");
                Ok(())
            }
            Err(e) => Err(self.ctx.report(e, PASSWORD_FAILED)),
        }
    }

    pub fn logout(&mut self) -> Result<()> {
        self.scope.close();
        self.ctx.session.logout()?;
        self.ctx.notifier.success("Logged out successfully");
        self.ctx.navigator.push(Route::Home);
        Ok(())
    }
}
