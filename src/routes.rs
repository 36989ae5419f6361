use crate::{notify::Notifier, session::SessionGate};
use serde::{Deserialize, Serialize};
use std::fmt;

pub const GALLERY_LOGIN_NOTICE: &str = "Please login to view your gallery";
pub const DASHBOARD_LOGIN_NOTICE: &str = "Please login to view your dashboard";
pub const NO_CREDIT_NOTICE: &str = "You have no credits left";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Route {
    Home,
    Generate,
    Gallery,
    Dashboard,
    BuyCredit,
    Settings,
}

impl Route {
    pub fn path(&self) -> &'static str {
        match self {
            Route::Home => "/",
            Route::Generate => "/result",
            Route::Gallery => "/gallery",
            Route::Dashboard => "/dashboard",
            Route::BuyCredit => "/buy",
            Route::Settings => "/settings",
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteDecision {
    Proceed,
    Redirect(Route),
}

/// Decides whether the host may enter `route`. Credit exhaustion is enforced here, before
/// the request controller is ever engaged; an unauthenticated visitor may still open the
/// generate page, which shows its own login prompt.
pub fn guard(route: Route, session: &dyn SessionGate, notifier: &dyn Notifier) -> RouteDecision {
    let authenticated = session.is_authenticated();

    let decision = match route {
        Route::Gallery if !authenticated => {
            notifier.error(GALLERY_LOGIN_NOTICE);
            RouteDecision::Redirect(Route::Home)
        }
        Route::Dashboard if !authenticated => {
            notifier.error(DASHBOARD_LOGIN_NOTICE);
            RouteDecision::Redirect(Route::Home)
        }
        Route::Generate if authenticated && session.credit() == 0 => {
            notifier.warning(NO_CREDIT_NOTICE);
            RouteDecision::Redirect(Route::BuyCredit)
        }
        _ => RouteDecision::Proceed,
    };

    if let RouteDecision::Redirect(to) = decision {
        log::info!("Redirecting {} -> {}", route, to);
    }
    decision
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{notify::NoticeBoard, session::StaticSession};

    #[test]
    fn test_gallery_requires_login() {
        let board = NoticeBoard::default();
        let decision = guard(Route::Gallery, &StaticSession::anonymous(), &board);
        assert_eq!(decision, RouteDecision::Redirect(Route::Home));
        assert_eq!(board.messages(), vec![GALLERY_LOGIN_NOTICE]);

        let signed_in = StaticSession::authenticated("t", 1);
        assert_eq!(guard(Route::Gallery, &signed_in, &board), RouteDecision::Proceed);
        assert_eq!(guard(Route::Dashboard, &signed_in, &board), RouteDecision::Proceed);
    }

    #[test]
    fn test_no_credit_redirects_to_purchase() {
        let board = NoticeBoard::default();
        let broke = StaticSession::authenticated("t", 0);
        assert_eq!(
            guard(Route::Generate, &broke, &board),
            RouteDecision::Redirect(Route::BuyCredit)
        );
        assert_eq!(board.messages(), vec![NO_CREDIT_NOTICE]);
    }

    #[test]
    fn test_generate_open_to_visitors_and_paying_users() {
        let board = NoticeBoard::default();
        assert_eq!(
            guard(Route::Generate, &StaticSession::anonymous(), &board),
            RouteDecision::Proceed
        );
        assert_eq!(
            guard(Route::Generate, &StaticSession::authenticated("t", 5), &board),
            RouteDecision::Proceed
        );
        assert!(board.messages().is_empty());
    }
}
