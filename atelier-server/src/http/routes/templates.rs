//! Legacy template URLs
//!
//! Templates were renamed to blueprints; old links keep working through a
//! permanent redirect.

use axum::{extract::Path, response::Redirect, routing::get, Router};

/// Location of a blueprint page. The id is percent-encoded so it arrives at
/// the target exactly as requested.
pub fn blueprint_location(id: &str) -> String {
    format!("/blueprints/{}", urlencoding::encode(id))
}

/// GET /templates/{id} -> 308 /blueprints/{id}
async fn redirect_template(Path(id): Path<String>) -> Redirect {
    Redirect::permanent(&blueprint_location(&id))
}

pub fn router<S>() -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    Router::new().route("/templates/{id}", get(redirect_template))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_ids_are_unchanged() {
        assert_eq!(blueprint_location("abc"), "/blueprints/abc");
        assert_eq!(blueprint_location("bp_01-x.y~z"), "/blueprints/bp_01-x.y~z");
    }

    #[test]
    fn special_characters_are_escaped() {
        assert_eq!(blueprint_location("a b"), "/blueprints/a%20b");
        assert_eq!(blueprint_location("a/b?c#d"), "/blueprints/a%2Fb%3Fc%23d");
        assert_eq!(blueprint_location("ünï"), "/blueprints/%C3%BCn%C3%AF");
    }
}
