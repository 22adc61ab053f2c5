// GET /robots.txt handler

use std::convert::Infallible;
use std::sync::Arc;

use warp::Reply;

use crate::state::AppState;

/// Declarative crawling policy: the dashboard, API, and login surfaces are
/// off-limits, everything else is crawlable, and the sitemap is
/// advertised.
pub async fn robots_txt_handler(state: Arc<AppState>) -> Result<warp::reply::Response, Infallible> {
    let body = render_policy(&state.config.public_base_url);
    Ok(
        warp::reply::with_header(body, "Content-Type", "text/plain; charset=utf-8")
            .into_response(),
    )
}

fn render_policy(public_base_url: &str) -> String {
    format!(
        "User-agent: *\n\
         Disallow: /dashboard\n\
         Disallow: /api\n\
         Disallow: /login\n\
         Allow: /\n\
         \n\
         Sitemap: {}/sitemap.xml\n",
        public_base_url.trim_end_matches('/')
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_policy_disallows_private_surfaces() {
        let policy = render_policy("https://www.example.com");
        assert!(policy.contains("Disallow: /dashboard"));
        assert!(policy.contains("Disallow: /api"));
        assert!(policy.contains("Disallow: /login"));
        assert!(policy.contains("Allow: /"));
    }

    #[test]
    fn test_policy_advertises_sitemap() {
        let policy = render_policy("https://www.example.com/");
        assert!(policy.contains("Sitemap: https://www.example.com/sitemap.xml"));
    }
}
