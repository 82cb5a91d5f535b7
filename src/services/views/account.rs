use crate::{
    error::{AppError, AppResult, Notice},
    models::{AccountUpdate, TitleId, TitleSummary, UserProfile},
    routes::ViewLifetime,
    services::session::CURRENT_PASSWORD_REQUIRED,
};

use super::{TitleListView, ViewContext, ViewModel};

pub const ACCOUNT_LOAD_FAILED: &str = "Failed to load account data.";
pub const ACCOUNT_UPDATED: &str = "Account updated!";
pub const ACCOUNT_UPDATE_FAILED: &str = "Failed to update account. Check your current password.";
pub const RATING_UPDATE_FAILED: &str = "Failed to update rating.";
pub const RATING_DELETE_FAILED: &str = "Failed to delete rating.";

/// Profile details and management of the user's own ratings
pub struct AccountView {
    ctx: ViewContext,
    profile: Option<UserProfile>,
    titles: Vec<TitleSummary>,
    notice: Option<Notice>,
}

impl AccountView {
    pub fn new(ctx: ViewContext) -> Self {
        Self {
            ctx,
            profile: None,
            titles: Vec::new(),
            notice: None,
        }
    }

    pub fn profile(&self) -> Option<&UserProfile> {
        self.profile.as_ref()
    }

    pub async fn update_account(&mut self, update: AccountUpdate) -> AppResult<()> {
        match self.ctx.session.update_account(&update).await {
            Ok(()) => {
                if let Some(profile) = self.profile.as_mut() {
                    if let Some(username) = update.username {
                        profile.username = username;
                    }
                    if let Some(email) = update.email {
                        profile.email = email;
                    }
                }
                self.notice = Some(Notice::success(ACCOUNT_UPDATED));
                Ok(())
            }
            Err(e) => {
                let message = match &e {
                    AppError::Validation(msg) if msg == CURRENT_PASSWORD_REQUIRED => msg.as_str(),
                    _ => ACCOUNT_UPDATE_FAILED,
                };
                self.notice = Some(Notice::error(message));
                Err(e)
            }
        }
    }

    pub async fn edit_rating(&mut self, title_id: TitleId, value: f64) -> AppResult<()> {
        match self.ctx.edit_rating(title_id, value).await {
            Ok(_) => Ok(()),
            Err(e) => {
                self.notice = Some(Notice::error(RATING_UPDATE_FAILED));
                Err(e)
            }
        }
    }

    pub async fn delete_rating(&mut self, title_id: TitleId) -> AppResult<()> {
        match self.ctx.delete_rating(title_id).await {
            Ok(()) => Ok(()),
            Err(e) => {
                self.notice = Some(Notice::error(RATING_DELETE_FAILED));
                Err(e)
            }
        }
    }
}

#[async_trait::async_trait]
impl TitleListView for AccountView {
    fn context(&self) -> &ViewContext {
        &self.ctx
    }

    /// Loads the profile and re-reads the rating list, refreshing the shared store
    async fn load(&mut self, lifetime: &ViewLifetime) -> AppResult<()> {
        let session = self.ctx.session.clone();
        let ratings = self.ctx.ratings.clone();
        let result = self
            .ctx
            .run_unhydrated(lifetime, async move {
                let profile = session.current_user().await?;
                let rows = session.check(ratings.reload().await)?;
                Ok((profile, rows))
            })
            .await;

        match result {
            Ok((profile, rows)) => {
                self.profile = Some(profile);
                self.titles = rows.iter().map(|row| row.summary()).collect();
                self.notice = None;
                Ok(())
            }
            Err(AppError::Cancelled) => Err(AppError::Cancelled),
            Err(e) => {
                self.notice = Some(Notice::error(ACCOUNT_LOAD_FAILED));
                Err(e)
            }
        }
    }

    /// Only titles that are still rated; a deleted rating drops its row
    fn render(&self) -> ViewModel {
        let rows = self
            .ctx
            .ratings
            .annotate(&self.titles)
            .into_iter()
            .filter(|row| row.rating.is_some())
            .collect();

        ViewModel {
            rows,
            notice: self.notice.clone(),
        }
    }
}
