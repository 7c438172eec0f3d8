use core_auth::{UserAction, UserProfile};
use tracing::{error, info};

use super::{Feedback, Navigation, Notice};
use crate::context::PageContext;

/// Header dropdown with the signed-in user's name, avatar and account links.
pub struct ProfileMenu {
    ctx: PageContext,
    open: bool,
}

impl ProfileMenu {
    pub fn new(ctx: PageContext) -> Self {
        Self { ctx, open: false }
    }

    /// `None` means the menu is not rendered.
    pub fn user(&self) -> Option<UserProfile> {
        self.ctx.store.current_user()
    }

    pub fn display_name(&self) -> Option<String> {
        self.user().map(|user| user.display_name())
    }

    pub fn avatar_url(&self) -> Option<String> {
        self.user().map(|user| user.avatar_url())
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn toggle(&mut self) {
        self.open = !self.open;
    }

    /// Click outside the menu.
    pub fn close(&mut self) {
        self.open = false;
    }

    pub fn go_to_profile(&mut self) -> Navigation {
        self.open = false;
        Navigation::to("/profile")
    }

    pub fn go_to_settings(&mut self) -> Navigation {
        self.open = false;
        Navigation::to("/settings")
    }

    /// End the provider session, then clear the local profile. The menu
    /// closes either way.
    pub async fn logout(&mut self) -> Feedback {
        let notice = match self.ctx.session.logout().await {
            Ok(()) => {
                self.ctx.store.dispatch(UserAction::ClearProfile);
                info!("Logged out");
                Notice::success("Logged out successfully")
            }
            Err(e) => {
                error!(error = %e, "Logout failed");
                Notice::error("Failed to logout")
            }
        };
        self.open = false;
        Feedback::notice(notice)
    }
}
