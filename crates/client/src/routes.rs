//! Application routing configuration.

use dioxus::prelude::*;

use crate::views::{Alumni, Contact, Courses, Home, Library, NotFound, School, SiteLayout, Students};

#[derive(Debug, Clone, Routable, PartialEq)]
#[rustfmt::skip]
pub enum Route {
    #[layout(SiteLayout)]
        #[route("/")]
        Home {},
        #[route("/school")]
        School {},
        #[route("/courses")]
        Courses {},
        #[route("/alumni")]
        Alumni {},
        #[route("/library")]
        Library {},
        #[route("/students")]
        Students {},
        #[route("/contact")]
        Contact {},
    #[end_layout]

    #[route("/:..segments")]
    NotFound { segments: Vec<String> },
}
