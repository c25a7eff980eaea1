//! Declarative metadata for the static pages.

use serde::Serialize;

/// Site name appended to page titles
pub const SITE_NAME: &str = "ImageFactory";

/// Default social preview image
pub const DEFAULT_PREVIEW_IMAGE: &str = "/og-image.png";

/// Social preview fields
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct OpenGraph {
    pub title: &'static str,
    pub description: &'static str,
    pub url: &'static str,
    pub image: &'static str,
    #[serde(rename = "type")]
    pub kind: &'static str,
}

/// Search engine indexing directives
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct Robots {
    pub index: bool,
    pub follow: bool,
}

/// Metadata of one static page
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct PageMetadata {
    pub slug: &'static str,
    pub path: &'static str,
    pub title: &'static str,
    pub description: &'static str,
    #[cfg_attr(feature = "openapi", schema(value_type = Vec<String>))]
    pub keywords: &'static [&'static str],
    pub open_graph: OpenGraph,
    pub robots: Robots,
}

static PAGES: [PageMetadata; 4] = [
    PageMetadata {
        slug: "login",
        path: "/login",
        title: "Log In | ImageFactory",
        description: "Sign in to ImageFactory to generate, evolve and manage your AI images.",
        keywords: &["login", "sign in", "ImageFactory", "AI image generator"],
        open_graph: OpenGraph {
            title: "Log In to ImageFactory",
            description: "Access your AI image gallery and evolution sessions.",
            url: "/login",
            image: DEFAULT_PREVIEW_IMAGE,
            kind: "website",
        },
        robots: Robots {
            index: false,
            follow: true,
        },
    },
    PageMetadata {
        slug: "signup",
        path: "/signup",
        title: "Create an Account | ImageFactory",
        description: "Create a free ImageFactory account and start generating AI images in seconds.",
        keywords: &["sign up", "register", "ImageFactory", "AI art", "free AI image generator"],
        open_graph: OpenGraph {
            title: "Join ImageFactory",
            description: "Generate, refine and share AI images and short videos.",
            url: "/signup",
            image: DEFAULT_PREVIEW_IMAGE,
            kind: "website",
        },
        robots: Robots {
            index: true,
            follow: true,
        },
    },
    PageMetadata {
        slug: "privacy",
        path: "/privacy",
        title: "Privacy Policy | ImageFactory",
        description: "How ImageFactory collects, uses and protects your personal data and generated content.",
        keywords: &["privacy policy", "data protection", "ImageFactory"],
        open_graph: OpenGraph {
            title: "ImageFactory Privacy Policy",
            description: "How we handle your data and generated images.",
            url: "/privacy",
            image: DEFAULT_PREVIEW_IMAGE,
            kind: "article",
        },
        robots: Robots {
            index: true,
            follow: true,
        },
    },
    PageMetadata {
        slug: "terms",
        path: "/terms",
        title: "Terms of Service | ImageFactory",
        description: "The terms governing your use of ImageFactory, including content ownership and payments.",
        keywords: &["terms of service", "terms and conditions", "ImageFactory"],
        open_graph: OpenGraph {
            title: "ImageFactory Terms of Service",
            description: "Rules for using ImageFactory and its generated content.",
            url: "/terms",
            image: DEFAULT_PREVIEW_IMAGE,
            kind: "article",
        },
        robots: Robots {
            index: true,
            follow: true,
        },
    },
];

/// All static pages
pub fn all_pages() -> &'static [PageMetadata] {
    &PAGES
}

/// Look up a page by slug
pub fn find_page(slug: &str) -> Option<&'static PageMetadata> {
    PAGES.iter().find(|page| page.slug == slug)
}
