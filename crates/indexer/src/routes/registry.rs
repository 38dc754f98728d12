//! Route registry backing the root endpoint's route listing.

use axum::{Router, routing::MethodRouter};
use serde::Serialize;
use std::sync::{Arc, PoisonError, RwLock};

/// Prefix every versioned route is nested under
pub const API_VERSION: &str = "/v1";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RouteInfo {
    pub path: String,
    pub method: String,
}

/// Routes in registration order, shared by every clone.
#[derive(Clone, Default)]
pub struct RouteRegistry(Arc<RwLock<Vec<RouteInfo>>>);

impl RouteRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&self, path: &str, method: &str) {
        let mut routes = self.0.write().unwrap_or_else(PoisonError::into_inner);
        let route = RouteInfo {
            path: path.to_string(),
            method: method.to_string(),
        };
        // create_app may run more than once against the same state
        if !routes.contains(&route) {
            routes.push(route);
        }
    }

    pub fn routes(&self) -> Vec<RouteInfo> {
        self.0.read().unwrap_or_else(PoisonError::into_inner).clone()
    }
}

/// Add a route to a router and record it, with `prefix` prepended, in the registry.
pub trait RegisterRoute<S: Clone + Send + Sync + 'static> {
    fn route_registered(
        self,
        registry: &RouteRegistry,
        prefix: &str,
        path: &str,
        method: &str,
        handler: MethodRouter<S>,
    ) -> Self;
}

impl<S: Clone + Send + Sync + 'static> RegisterRoute<S> for Router<S> {
    fn route_registered(
        self,
        registry: &RouteRegistry,
        prefix: &str,
        path: &str,
        method: &str,
        handler: MethodRouter<S>,
    ) -> Self {
        registry.add(&format!("{}{}", prefix, path), method);
        // The router itself is nested under the prefix by the caller.
        self.route(path, handler)
    }
}
