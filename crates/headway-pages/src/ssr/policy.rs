//! Choosing how long to buffer before flushing.

use headway_http::Request;
use once_cell::sync::Lazy;
use regex::Regex;

/// When the response starts flowing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReadyStrategy {
	/// Flush as soon as the shell is ready; deferred content streams in.
	ShellReady,
	/// Wait for every deferred subtree (or the deadline), then flush.
	AllReady,
}

/// Picks a [`ReadyStrategy`] for a request.
pub trait ReadyPolicy: Send + Sync {
	/// Returns the strategy for `request`.
	fn strategy(&self, request: &Request) -> ReadyStrategy;
}

static CRAWLER_PATTERN: Lazy<Regex> = Lazy::new(|| {
	Regex::new(
		r"(?i)(bot|crawl|spider|slurp|bingpreview|facebookexternalhit|embedly|quora link preview|outbrain|pinterest|vkshare|w3c_validator|whatsapp|lighthouse|headlesschrome|curl|wget|python-requests|go-http-client)",
	)
	.expect("Invalid crawler regex pattern")
});

/// Returns `true` if `user_agent` looks like an automated client.
///
/// A missing user agent counts as interactive.
///
/// # Examples
///
/// ```
/// use headway_pages::ssr::is_crawler;
///
/// assert!(is_crawler(Some("Mozilla/5.0 (compatible; Googlebot/2.1)")));
/// assert!(!is_crawler(Some("Mozilla/5.0 (X11; Linux x86_64) Firefox/128.0")));
/// assert!(!is_crawler(None));
/// ```
pub fn is_crawler(user_agent: Option<&str>) -> bool {
	user_agent.is_some_and(|ua| CRAWLER_PATTERN.is_match(ua))
}

/// Waits for everything for crawlers and flushes the shell for browsers.
#[derive(Debug, Clone, Copy, Default)]
pub struct CrawlerPolicy;

impl ReadyPolicy for CrawlerPolicy {
	fn strategy(&self, request: &Request) -> ReadyStrategy {
		if is_crawler(request.user_agent()) {
			ReadyStrategy::AllReady
		} else {
			ReadyStrategy::ShellReady
		}
	}
}

/// Uses the same strategy for every request.
#[derive(Debug, Clone, Copy)]
pub struct FixedPolicy(pub ReadyStrategy);

impl ReadyPolicy for FixedPolicy {
	fn strategy(&self, _request: &Request) -> ReadyStrategy {
		self.0
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	fn request_with(user_agent: Option<&str>) -> Request {
		let builder = Request::builder().uri("/");
		match user_agent {
			Some(ua) => builder.header("user-agent", ua),
			None => builder,
		}
		.build()
		.unwrap()
	}

	#[rstest]
	#[case(Some("Googlebot/2.1 (+http://www.google.com/bot.html)"), ReadyStrategy::AllReady)]
	#[case(Some("Mozilla/5.0 (compatible; bingbot/2.0)"), ReadyStrategy::AllReady)]
	#[case(Some("facebookexternalhit/1.1"), ReadyStrategy::AllReady)]
	#[case(Some("curl/8.5.0"), ReadyStrategy::AllReady)]
	#[case(
		Some("Mozilla/5.0 (Macintosh; Intel Mac OS X 14_0) AppleWebKit/605.1.15 Safari/605.1.15"),
		ReadyStrategy::ShellReady
	)]
	#[case(None, ReadyStrategy::ShellReady)]
	fn test_crawler_policy(#[case] user_agent: Option<&str>, #[case] expected: ReadyStrategy) {
		// Arrange
		let request = request_with(user_agent);

		// Act
		let strategy = CrawlerPolicy.strategy(&request);

		// Assert
		assert_eq!(strategy, expected);
	}

	#[rstest]
	fn test_fixed_policy_ignores_user_agent() {
		// Arrange
		let request = request_with(Some("Googlebot"));

		// Act & Assert
		assert_eq!(
			FixedPolicy(ReadyStrategy::ShellReady).strategy(&request),
			ReadyStrategy::ShellReady
		);
	}
}
