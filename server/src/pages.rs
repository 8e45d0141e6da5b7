use include_dir::{include_dir, Dir};

static PAGES: Dir<'_> = include_dir!("$CARGO_MANIFEST_DIR/pages");

pub(crate) const START_PAGE: &str = "home";

// Last resort when the page store itself is broken.
const SERVER_ERROR_HTML: &str =
    "<div class=\"page\" data-page=\"error\"><h1>SERVER ERROR!</h1></div>";

/// Server-rendered markup for a screen. Unknown names resolve to the error
/// page so a wrong page request still leaves the client on something usable.
pub(crate) fn page_html(name: &str) -> &'static str {
    match lookup(name) {
        Some(html) => html,
        None => {
            tracing::warn!("unknown page '{}'", name);
            lookup("error").unwrap_or(SERVER_ERROR_HTML)
        }
    }
}

fn lookup(name: &str) -> Option<&'static str> {
    PAGES.get_file(format!("{}.html", name))?.contents_utf8()
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    pub fn start_page_exists() {
        assert!(page_html(START_PAGE).contains("data-page=\"home\""));
    }

    #[test]
    pub fn unknown_page_falls_back_to_error_page() {
        assert!(page_html("no-such-page").contains("data-page=\"error\""));
    }

    #[test]
    pub fn every_page_names_itself() {
        for file in PAGES.files() {
            let name = file
                .path()
                .file_stem()
                .and_then(|stem| stem.to_str())
                .unwrap();
            let html = file.contents_utf8().unwrap();
            assert!(
                html.contains(&format!("data-page=\"{}\"", name)),
                "page '{}' does not carry its own name",
                name
            );
        }
    }
}
