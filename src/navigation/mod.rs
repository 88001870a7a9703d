//! Client-side navigation: guards decide whether a transition may commit,
//! resolvers pre-fetch the destination's data, and the navigator ties both to
//! a validated route table.

pub mod guards;
pub mod request;
pub mod resolvers;
pub mod router;
pub mod routes;

pub use guards::{
    DEFAULT_PATH, FORBIDDEN_PATH, Guard, GuardDecision, LOGIN_PATH, require_anonymous,
    require_authenticated, require_role,
};
pub use request::{NavigationRequest, NavigationTicket, UrlTarget, split_url};
pub use resolvers::{
    POST_ID_PARAM, ResolvedData, Resolver, RouteData, parse_post_id, resolve_post,
    resolve_post_list,
};
pub use router::{ActivatedRoute, MAX_REDIRECTS, NavigationOutcome, Navigator};
pub use routes::{Page, RouteConfigError, RouteDef, RouteMatch, RouteTable, default_routes};
