use anyhow::{bail, Context};
use clap::{Parser, Subcommand, ValueEnum};

use screenpick::{
    models::{AccountUpdate, SearchFacet, SearchRequest, SortBy, SortOrder, TitleId},
    routes::{Admission, Route, ViewLifetime},
    services::{
        AccountView, RecommendationsView, SearchView, TitleListView, TrendingView, ViewModel,
    },
    AppError, AppState, NoticeLevel,
};

#[derive(Parser, Debug)]
#[command(name = "screenpick", version, about = "Browse, rate and get predictions for movies and TV")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Log in and remember the session
    Login {
        username: String,
        #[arg(long, env = "SCREENPICK_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Create an account (log in afterwards)
    Register {
        username: String,
        email: String,
        #[arg(long, env = "SCREENPICK_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Forget the session and every cached rating
    Logout,
    /// Show the logged-in account
    Whoami,
    /// Most-voted titles
    Top,
    /// Search titles by one facet
    Search {
        query: String,
        #[arg(long, default_value = "title")]
        by: SearchFacet,
        #[arg(long, value_enum, default_value_t = SortField::AverageRating)]
        sort_by: SortField,
        #[arg(long, value_enum, default_value_t = Direction::Desc)]
        order: Direction,
    },
    /// Personalized recommendations
    Recommendations {
        /// Retrain the recommender before listing
        #[arg(long)]
        retrain: bool,
    },
    /// List your ratings
    Ratings,
    /// Rate a title you have not rated yet
    Rate { title_id: i64, value: f64 },
    /// Change one of your ratings
    EditRating { title_id: i64, value: f64 },
    /// Remove one of your ratings
    DeleteRating { title_id: i64 },
    /// Predict your rating for a title you have not rated
    Predict { title_id: i64 },
    /// Change username, email or password
    UpdateAccount {
        #[arg(long, env = "SCREENPICK_PASSWORD", hide_env_values = true)]
        current_password: String,
        #[arg(long)]
        username: Option<String>,
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        new_password: Option<String>,
    },
    /// Suggestion list for a search facet
    Options {
        #[arg(default_value = "genres")]
        facet: SearchFacet,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug)]
pub enum SortField {
    AverageRating,
    NumVotes,
}

impl From<SortField> for SortBy {
    fn from(field: SortField) -> Self {
        match field {
            SortField::AverageRating => SortBy::AverageRating,
            SortField::NumVotes => SortBy::NumVotes,
        }
    }
}

#[derive(ValueEnum, Clone, Copy, Debug)]
pub enum Direction {
    Asc,
    Desc,
}

impl From<Direction> for SortOrder {
    fn from(direction: Direction) -> Self {
        match direction {
            Direction::Asc => SortOrder::Asc,
            Direction::Desc => SortOrder::Desc,
        }
    }
}

/// Enters `route` through the guard, failing when the session is missing
fn enter(state: &AppState, route: Route) -> anyhow::Result<ViewLifetime> {
    match state.navigator().navigate(route) {
        Admission::Admitted(lifetime) => Ok(lifetime),
        Admission::Redirect(target) => {
            bail!("Not logged in (redirected to {}); run `screenpick login` first", target)
        }
    }
}

fn print_view(view: &ViewModel) {
    if let Some(notice) = &view.notice {
        match notice.level {
            NoticeLevel::Error => eprintln!("error: {}", notice),
            NoticeLevel::Info | NoticeLevel::Success => println!("{}", notice),
        }
    }

    for row in &view.rows {
        let title = &row.title;
        let year = title
            .start_year
            .map(|y| y.to_string())
            .unwrap_or_default();
        let yours = row
            .rating
            .as_ref()
            .map(|r| format!("{:.1}", r.value))
            .unwrap_or_else(|| "rate".to_string());
        let predicted = match (&row.prediction, row.can_predict()) {
            (Some(p), _) => format!("{:.2}", p.predicted_value),
            (None, true) => "predict".to_string(),
            (None, false) => "-".to_string(),
        };

        println!(
            "{:>9}  {:<40} {:>4}  {:<14} avg {:>4.1}  votes {:>9}  yours {:>5}  predicted {:>7}",
            title.id,
            title.title,
            year,
            title.title_type.label(),
            title.average_rating,
            title.num_votes,
            yours,
            predicted,
        );
    }
}

/// Turns a view failure into a non-zero exit, labelled with the notice it showed
fn shown(result: Result<(), AppError>, view: &ViewModel) -> anyhow::Result<()> {
    result.map_err(|e| match &view.notice {
        Some(notice) => anyhow::Error::new(e).context(notice.message.clone()),
        None => e.into(),
    })
}

pub async fn run(command: Command, state: &AppState) -> anyhow::Result<()> {
    let ctx = state.view_context();

    match command {
        Command::Login { username, password } => {
            state.session.login(&username, &password).await?;
            println!("Logged in as {}", username);
        }
        Command::Register {
            username,
            email,
            password,
        } => {
            state.session.register(&username, &email, &password).await?;
            println!("Registered {}; log in to continue", username);
        }
        Command::Logout => {
            state.session.logout()?;
            println!("Logged out");
        }
        Command::Whoami => {
            enter(state, Route::Account)?;
            let profile = state.session.current_user().await?;
            println!("{} <{}>", profile.username, profile.email);
        }
        Command::Top => {
            let lifetime = enter(state, Route::TopTitles)?;
            let mut view = TrendingView::new(ctx);
            let result = view.load(&lifetime).await;
            let model = view.render();
            print_view(&model);
            shown(result, &model)?;
        }
        Command::Search {
            query,
            by,
            sort_by,
            order,
        } => {
            let lifetime = enter(state, Route::Search(None))?;
            let mut view = SearchView::new(ctx);
            view.set_request(SearchRequest::new(by, query).sorted(sort_by.into(), order.into()));
            let result = view.search(&lifetime).await;
            let model = view.render();
            print_view(&model);
            shown(result, &model)?;
        }
        Command::Recommendations { retrain } => {
            let lifetime = enter(state, Route::Recommendations)?;
            let mut view = RecommendationsView::new(ctx);
            let result = if retrain {
                view.refresh(&lifetime).await
            } else {
                view.load(&lifetime).await
            };
            let model = view.render();
            print_view(&model);
            shown(result, &model)?;
        }
        Command::Ratings => {
            let lifetime = enter(state, Route::Account)?;
            let mut view = AccountView::new(ctx);
            let result = view.load(&lifetime).await;
            let model = view.render();
            print_view(&model);
            shown(result, &model)?;
        }
        Command::Rate { title_id, value } => {
            enter(state, Route::TopTitles)?;
            state.session.check(state.ratings.ensure_loaded().await)?;
            let entry = ctx.rate(TitleId(title_id), value).await?;
            println!("Rated title {} with {:.1}", entry.title_id, entry.value);
        }
        Command::EditRating { title_id, value } => {
            let lifetime = enter(state, Route::Account)?;
            let mut view = AccountView::new(ctx);
            view.load(&lifetime).await?;
            view.edit_rating(TitleId(title_id), value).await?;
            print_view(&view.render());
        }
        Command::DeleteRating { title_id } => {
            let lifetime = enter(state, Route::Account)?;
            let mut view = AccountView::new(ctx);
            view.load(&lifetime).await?;
            view.delete_rating(TitleId(title_id)).await?;
            print_view(&view.render());
        }
        Command::Predict { title_id } => {
            enter(state, Route::TopTitles)?;
            state.session.check(state.ratings.ensure_loaded().await)?;
            let title_id = TitleId(title_id);
            match ctx.predict(title_id).await? {
                Some(prediction) => println!(
                    "Predicted rating for {}: {:.2}",
                    title_id, prediction.predicted_value
                ),
                None => println!("Title {} is already rated; no prediction needed", title_id),
            }
        }
        Command::UpdateAccount {
            current_password,
            username,
            email,
            new_password,
        } => {
            let lifetime = enter(state, Route::Account)?;
            let mut view = AccountView::new(ctx);
            view.load(&lifetime).await?;

            let mut update = AccountUpdate::new(current_password);
            if let Some(username) = username {
                update = update.username(username);
            }
            if let Some(email) = email {
                update = update.email(email);
            }
            if let Some(password) = new_password {
                update = update.password(password);
            }

            let result = view.update_account(update).await;
            let model = view.render();
            if let Some(notice) = &model.notice {
                println!("{}", notice);
            }
            result.context("account update failed")?;
        }
        Command::Options { facet } => {
            enter(state, Route::Search(None))?;
            let view = SearchView::new(ctx);
            for option in view.options(facet).await {
                println!("{}", option);
            }
        }
    }

    Ok(())
}
