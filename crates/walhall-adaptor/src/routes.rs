//! Route table for the public surface.

use http::Method;

/// A matched public route.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    /// `GET /healthz` — liveness.
    Health,
    /// `GET /readyz` — readiness.
    Ready,
    /// `GET /orgs` — names of the caller's orgs.
    ListOrgs,
    /// `GET /orgs/{org}/modules` — modules available in an org.
    ListModules {
        /// Org name from the path.
        org: String,
    },
    /// `POST /orgs/{org}/modules/refresh` — trigger a module refresh.
    RefreshModules {
        /// Org name from the path.
        org: String,
    },
    /// `GET /orgs/{org}/modules/refresh` — poll the refresh status.
    RefreshModulesStatus {
        /// Org name from the path.
        org: String,
    },
}

impl Route {
    /// Match a method and path (without query string) against the table.
    pub fn matches(method: &Method, path: &str) -> Option<Self> {
        let segments: Vec<&str> = path.trim_matches('/').split('/').collect();

        match segments.as_slice() {
            ["healthz"] if method == Method::GET => Some(Self::Health),
            ["readyz"] if method == Method::GET => Some(Self::Ready),
            ["orgs"] if method == Method::GET => Some(Self::ListOrgs),
            ["orgs", org, "modules"] if method == Method::GET => Some(Self::ListModules {
                org: (*org).to_string(),
            }),
            ["orgs", org, "modules", "refresh"] if method == Method::POST => {
                Some(Self::RefreshModules {
                    org: (*org).to_string(),
                })
            }
            ["orgs", org, "modules", "refresh"] if method == Method::GET => {
                Some(Self::RefreshModulesStatus {
                    org: (*org).to_string(),
                })
            }
            _ => None,
        }
    }
}
