mod common;

use common::{Harness, post, status_error};
use post_portal::{
    models::UserRole,
    navigation::{
        Guard, NavigationOutcome, Navigator, Page, Resolver, RouteConfigError, RouteDef,
        RouteMatch, RouteTable, default_routes,
    },
};
use reqwest::Method;
use std::time::Duration;

fn activated(outcome: NavigationOutcome) -> post_portal::navigation::ActivatedRoute {
    match outcome {
        NavigationOutcome::Activated(route) => route,
        other => panic!("expected Activated, got {other:?}"),
    }
}

// --- Guarded navigation ---

#[tokio::test]
async fn test_protected_page_without_token_lands_on_login_with_return_url() {
    let h = Harness::new(&[]);
    let route = activated(h.navigator().navigate("/post/index").await);

    assert_eq!(route.page, Page::Login);
    assert_eq!(route.url, "/auth/login?returnUrl=%2Fpost%2Findex");
    assert_eq!(route.query_value("returnUrl"), Some("/post/index"));
    assert_eq!(h.transport.total_attempts(), 0);
}

#[tokio::test]
async fn test_user_role_on_admin_lands_on_forbidden() {
    let h = Harness::signed_in("user");
    let route = activated(h.navigator().navigate("/admin").await);

    assert_eq!(route.page, Page::Forbidden);
    assert_eq!(route.url, "/forbidden?from=%2Fadmin");
}

#[tokio::test]
async fn test_admin_reaches_dashboard() {
    let h = Harness::signed_in("admin");
    let route = activated(h.navigator().navigate("/admin").await);
    assert_eq!(route.page, Page::AdminDashboard);
    assert!(route.data.is_empty());
}

#[tokio::test]
async fn test_signed_in_user_is_bounced_off_login() {
    let h = Harness::signed_in("user");
    h.transport.respond_json(Method::GET, "/posts", &vec![post(1, "a")]);

    let route = activated(h.navigator().navigate("/auth/login").await);

    assert_eq!(route.page, Page::PostIndex);
    assert_eq!(route.url, "/post/index");
}

#[tokio::test]
async fn test_root_redirects_and_resolves_post_list() {
    let h = Harness::signed_in("user");
    h.transport.respond_json(Method::GET, "/posts", &vec![post(1, "a"), post(2, "b")]);

    let navigator = h.navigator();
    let route = activated(navigator.navigate("/").await);

    assert_eq!(route.page, Page::PostIndex);
    assert_eq!(route.data.post_list().map(<[_]>::len), Some(2));
    assert_eq!(navigator.current_url().as_deref(), Some("/post/index"));
}

#[tokio::test]
async fn test_detail_route_with_malformed_id_activates_without_fetching() {
    let h = Harness::signed_in("user");
    let route = activated(h.navigator().navigate("/post/abc/view").await);

    assert_eq!(route.page, Page::PostView);
    assert_eq!(route.data.post(), None);
    assert_eq!(h.transport.total_attempts(), 0);
}

#[tokio::test]
async fn test_detail_route_resolves_post() {
    let h = Harness::signed_in("user");
    h.transport.respond_json(Method::GET, "/posts/4", &post(4, "four"));

    let route = activated(h.navigator().navigate("/post/4/edit").await);

    assert_eq!(route.page, Page::PostEdit);
    assert_eq!(route.params.get("postId").map(String::as_str), Some("4"));
    assert_eq!(route.data.post(), Some(&post(4, "four")));
}

#[tokio::test]
async fn test_unknown_path_falls_back_to_not_found() {
    let h = Harness::signed_in("user");
    let route = activated(h.navigator().navigate("/does/not/exist").await);
    assert_eq!(route.page, Page::NotFound);
}

#[tokio::test]
async fn test_reload_runs_resolvers_again() {
    let h = Harness::signed_in("user");
    h.transport
        .respond(Method::GET, "/posts", Err(status_error(403, None)));
    h.transport.respond_json(Method::GET, "/posts", &vec![post(1, "a")]);

    let navigator = h.navigator();
    let first = activated(navigator.navigate("/post/index").await);
    assert_eq!(first.data.post_list(), None);

    let second = activated(navigator.reload().await);
    assert_eq!(second.data.post_list().map(<[_]>::len), Some(1));
    assert_eq!(h.transport.attempts(Method::GET, "/posts"), 2);
}

// --- Superseded navigations ---

#[tokio::test(start_paused = true)]
async fn test_newer_navigation_supersedes_older_one() {
    let h = Harness::signed_in("user");
    h.transport.set_latency(Duration::from_millis(200));
    h.transport.respond_json(Method::GET, "/posts", &vec![post(1, "a")]);
    h.transport.respond_json(Method::GET, "/posts/1", &post(1, "a"));

    let navigator = h.navigator();
    let older = {
        let navigator = navigator.clone();
        tokio::spawn(async move { navigator.navigate("/post/index").await })
    };
    tokio::time::sleep(Duration::from_millis(50)).await;

    let newer = activated(navigator.navigate("/post/1/view").await);

    assert!(matches!(older.await.unwrap(), NavigationOutcome::Superseded));
    assert_eq!(newer.page, Page::PostView);
    assert_eq!(navigator.current_url().as_deref(), Some("/post/1/view"));
}

#[tokio::test(start_paused = true)]
async fn test_superseded_navigation_stops_retrying_silently() {
    let h = Harness::signed_in("user");
    h.transport.respond(Method::GET, "/posts", Err(status_error(500, None)));

    let navigator = h.navigator();
    let older = {
        let navigator = navigator.clone();
        tokio::spawn(async move { navigator.navigate("/post/index").await })
    };
    // Inside the first backoff window.
    tokio::time::sleep(Duration::from_millis(500)).await;
    let newer = activated(navigator.navigate("/forbidden").await);

    assert!(matches!(older.await.unwrap(), NavigationOutcome::Superseded));
    assert_eq!(newer.page, Page::Forbidden);
    assert_eq!(h.transport.attempts(Method::GET, "/posts"), 1);
    assert!(h.sink.all().is_empty());
    assert_eq!(h.busy.in_flight(), 0);
}

// --- Route table ---

#[test]
fn test_default_routes_lookup() {
    let table = default_routes().unwrap();

    assert!(matches!(table.lookup("/"), RouteMatch::Redirect("/post/index")));
    assert!(matches!(table.lookup("/auth"), RouteMatch::Redirect("/auth/login")));
    assert!(matches!(
        table.lookup("/post/12/view"),
        RouteMatch::Route { page: Page::PostView, .. }
    ));
    assert!(matches!(table.lookup("/post/12"), RouteMatch::Fallback(Page::NotFound)));

    let RouteMatch::Route { route, .. } = table.lookup("/admin") else {
        panic!("admin route missing");
    };
    assert_eq!(route.roles, vec![UserRole::Admin]);
    assert_eq!(route.guards, vec![Guard::RequireAuthenticated, Guard::RequireRole]);
}

#[test]
fn test_route_table_rejects_bad_definitions() {
    let duplicate = RouteTable::new(vec![
        RouteDef::page("/a", Page::Forbidden),
        RouteDef::page("/a", Page::NotFound),
    ]);
    assert_eq!(duplicate.unwrap_err(), RouteConfigError::DuplicatePattern("/a".into()));

    let roles_without_guard = RouteTable::new(vec![
        RouteDef::page("/admin", Page::AdminDashboard)
            .guard(Guard::RequireAuthenticated)
            .roles([UserRole::Admin]),
    ]);
    assert!(matches!(
        roles_without_guard,
        Err(RouteConfigError::RolesWithoutRoleGuard(_))
    ));

    let missing_param = RouteTable::new(vec![
        RouteDef::page("/post/view", Page::PostView).resolve(Resolver::Post),
    ]);
    assert!(matches!(missing_param, Err(RouteConfigError::MissingParam { .. })));

    let guarded_redirect = RouteTable::new(vec![
        RouteDef::redirect("/", "/home").guard(Guard::RequireAuthenticated),
    ]);
    assert!(matches!(
        guarded_redirect,
        Err(RouteConfigError::RedirectWithBehaviour(_))
    ));

    let relative = RouteTable::new(vec![RouteDef::page("post", Page::PostIndex)]);
    assert!(matches!(relative, Err(RouteConfigError::InvalidPattern(_))));

    let mut nowhere = RouteDef::page("/nowhere", Page::NotFound);
    nowhere.page = None;
    assert!(matches!(
        RouteTable::new(vec![nowhere]),
        Err(RouteConfigError::NoDestination(_))
    ));
}

#[tokio::test]
async fn test_redirect_loop_is_bounded() {
    let h = Harness::signed_in("user");
    let table = RouteTable::new(vec![
        RouteDef::redirect("/a", "/b"),
        RouteDef::redirect("/b", "/a"),
    ])
    .unwrap();
    let navigator = Navigator::new(table, h.store.clone(), h.posts.clone());

    let outcome = navigator.navigate("/a").await;

    assert!(matches!(outcome, NavigationOutcome::TooManyRedirects { .. }));
    assert_eq!(navigator.current_url(), None);
}
