//! HTTP API handlers for mdash-layout

pub mod appcomponent;
pub mod appinfo;
pub mod breadcrumb;
pub mod envelope;
pub mod health;

pub use appcomponent::get_app_component;
pub use appinfo::get_app_info;
pub use breadcrumb::get_breadcrumb;
pub use envelope::ResponseEnvelope;
pub use health::health_routes;
