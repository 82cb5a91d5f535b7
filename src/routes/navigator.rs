use super::{Admission, Route, RouteGuard, ViewLifetime};

/// Tracks the active route and ends the previous view's lifetime on every navigation
pub struct Navigator {
    guard: RouteGuard,
    current: Route,
    lifetime: ViewLifetime,
}

impl Navigator {
    pub fn new(guard: RouteGuard) -> Self {
        Self {
            guard,
            current: Route::Home,
            lifetime: ViewLifetime::new(),
        }
    }

    pub fn current(&self) -> &Route {
        &self.current
    }

    pub fn lifetime(&self) -> &ViewLifetime {
        &self.lifetime
    }

    /// Leaves the current view and enters `route`, or the login view if the guard refuses
    pub fn navigate(&mut self, route: Route) -> Admission {
        self.lifetime.end();

        let admission = self.guard.admit(&route);
        match &admission {
            Admission::Admitted(lifetime) => {
                self.current = route;
                self.lifetime = lifetime.clone();
            }
            Admission::Redirect(target) => {
                self.current = target.clone();
                self.lifetime = ViewLifetime::new();
            }
        }

        tracing::debug!(route = %self.current, "Navigated");
        admission
    }
}
