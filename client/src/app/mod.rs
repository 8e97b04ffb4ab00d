//! Application context: one session, one store per entity kind and the
//! navigation guard, all sharing the same ports.

mod bootstrap;

use std::sync::Arc;

use crate::domain::ports::{KeyValueStorage, Notifier, RemoteApi};
use crate::domain::{
    AccessGuard, Activity, Coupon, LocationStore, OrderedQuantity, Plan, PurchasedCoupon,
    ResourceStore, SessionStore, StatisticsStore, StoreContext, StorePolicy, TourPackage,
    UserProfile,
};
use crate::inbound::navigation::{NavigationGuard, RedirectPaths, RouteTable};

pub use bootstrap::{BootstrapError, build_context};

/// Adapters the context is assembled from.
#[derive(Clone)]
pub struct ClientPorts {
    /// Resource API.
    pub api: Arc<dyn RemoteApi>,
    /// Authentication API.
    pub auth_api: Arc<dyn RemoteApi>,
    /// Durable session storage.
    pub storage: Arc<dyn KeyValueStorage>,
    /// User-facing notices.
    pub notifier: Arc<dyn Notifier>,
}

/// Everything a front end needs to drive the portal.
pub struct AppContext {
    /// Authenticated session.
    pub session: Arc<SessionStore>,
    /// Activity catalogue.
    pub activities: ResourceStore<Activity>,
    /// Tour packages.
    pub packages: ResourceStore<TourPackage>,
    /// Plans inside packages.
    pub plans: ResourceStore<Plan>,
    /// Activity reservations inside plans.
    pub ordered_quantities: ResourceStore<OrderedQuantity>,
    /// User profiles.
    pub users: ResourceStore<UserProfile>,
    /// Loyalty coupons.
    pub coupons: ResourceStore<Coupon>,
    /// Coupons bought by customers.
    pub purchased_coupons: ResourceStore<PurchasedCoupon>,
    /// Revenue statistics.
    pub statistics: StatisticsStore,
    /// Location names.
    pub locations: LocationStore,
    /// Pre-navigation guard.
    pub navigation: NavigationGuard,
}

impl AppContext {
    /// Wire the stores around `ports`. The session is rehydrated from
    /// storage before any store is created.
    pub fn assemble(
        ports: ClientPorts,
        policy: StorePolicy,
        routes: RouteTable,
        paths: RedirectPaths,
    ) -> Self {
        let session = Arc::new(SessionStore::restore(
            ports.auth_api,
            ports.storage,
            Arc::clone(&ports.notifier),
        ));
        let context =
            StoreContext::new(ports.api, Arc::clone(&session), Arc::clone(&ports.notifier))
                .with_policy(policy);
        let navigation = NavigationGuard::new(
            routes,
            AccessGuard::new(ports.notifier),
            Arc::clone(&session),
            paths,
        );
        Self {
            activities: ResourceStore::new(context.clone()),
            packages: ResourceStore::new(context.clone()),
            plans: ResourceStore::new(context.clone()),
            ordered_quantities: ResourceStore::new(context.clone()),
            users: ResourceStore::new(context.clone()),
            coupons: ResourceStore::new(context.clone()),
            purchased_coupons: ResourceStore::new(context.clone()),
            statistics: StatisticsStore::new(context.clone()),
            locations: LocationStore::new(context),
            session,
            navigation,
        }
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use crate::domain::{AccessPolicy, Role};
    use crate::inbound::navigation::Navigation;
    use crate::outbound::storage::MemoryStorage;
    use crate::test_support::{RecordingNotifier, ScriptedApi, identity};
    use rstest::rstest;
    use serde_json::json;

    fn ports(api: Arc<ScriptedApi>, storage: MemoryStorage) -> ClientPorts {
        ClientPorts {
            api,
            auth_api: Arc::new(ScriptedApi::new()),
            storage: Arc::new(storage),
            notifier: Arc::new(RecordingNotifier::new()),
        }
    }

    fn stored_session(token: &str, role: &str) -> MemoryStorage {
        let user = serde_json::to_string(&identity("u1", role)).expect("identity serialises");
        MemoryStorage::with_entries([("token", token.to_owned()), ("user", user)])
    }

    #[rstest]
    #[tokio::test]
    async fn stores_share_the_rehydrated_session() {
        let api = Arc::new(ScriptedApi::new());
        let app = AppContext::assemble(
            ports(api.clone(), stored_session("tok-9", "Superadmin")),
            StorePolicy::default(),
            RouteTable::new(),
            RedirectPaths::default(),
        );
        api.push_ok(200, "ok", Some(json!([])));

        app.coupons.list().await.expect("listing succeeds");

        let sent = api.last_request().expect("request recorded");
        assert_eq!(sent.bearer().map(|token| token.expose()), Some("tok-9"));
    }

    #[rstest]
    fn navigation_uses_the_same_session() {
        let routes = RouteTable::new()
            .route(
                "users",
                "/users",
                AccessPolicy::authenticated().with_roles([Role::Superadmin]),
            )
            .expect("valid route");
        let app = AppContext::assemble(
            ports(Arc::new(ScriptedApi::new()), stored_session("tok", "Customer")),
            StorePolicy::default(),
            routes,
            RedirectPaths::default(),
        );

        assert_eq!(app.navigation.before_each("/users"), Navigation::RedirectTo("/".to_owned()));
        app.session.logout();
        assert_eq!(
            app.navigation.before_each("/users"),
            Navigation::RedirectTo("/login".to_owned())
        );
    }
}
