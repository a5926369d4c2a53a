//! HTML pages for the poll views.
//!
//! Each page is rendered from a context struct. `render` also stores the
//! context in the response extensions so callers further down the stack
//! (and tests) can inspect what a page was rendered with.

use axum::response::{Html, IntoResponse, Response};
use serde::Serialize;

use crate::models::{Choice, Question};
use crate::routes::Urls;

pub const NO_POLLS_AVAILABLE: &str = "No polls are available.";
pub const NO_CHOICE_SELECTED: &str = "You didn't select a choice.";

pub trait Template {
    fn render(&self, urls: &Urls) -> String;
}

pub fn render<T>(context: T, urls: &Urls) -> Response
where
    T: Template + Clone + Send + Sync + 'static,
{
    let mut response = Html(context.render(urls)).into_response();
    response.extensions_mut().insert(context);
    response
}

#[derive(Debug, Clone, Serialize)]
pub struct IndexContext {
    pub latest_question_list: Vec<Question>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DetailContext {
    pub question: Question,
    pub choices: Vec<Choice>,
    pub error_message: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ResultsContext {
    pub question: Question,
    pub choices: Vec<Choice>,
}

impl Template for IndexContext {
    fn render(&self, urls: &Urls) -> String {
        let body = if self.latest_question_list.is_empty() {
            format!("<p>{}</p>", NO_POLLS_AVAILABLE)
        } else {
            let items: String = self
                .latest_question_list
                .iter()
                .map(|q| {
                    format!(
                        "    <li><a href=\"{}\">{}</a></li>\n",
                        escape(&urls.detail(q.id)),
                        escape(&q.question_text)
                    )
                })
                .collect();
            format!("<ul>\n{}</ul>", items)
        };
        layout("Polls", urls, &body)
    }
}

impl Template for DetailContext {
    fn render(&self, urls: &Urls) -> String {
        let mut body = format!(
            "<form action=\"{}\" method=\"post\">\n<fieldset>\n    <legend><h1>{}</h1></legend>\n",
            escape(&urls.vote(self.question.id)),
            escape(&self.question.question_text)
        );
        if let Some(message) = &self.error_message {
            body.push_str(&format!(
                "    <p class=\"error\"><strong>{}</strong></p>\n",
                escape(message)
            ));
        }
        for (n, choice) in self.choices.iter().enumerate() {
            body.push_str(&format!(
                "    <input type=\"radio\" name=\"choice\" id=\"choice{n}\" value=\"{id}\">\n    \
                 <label for=\"choice{n}\">{text}</label><br>\n",
                n = n + 1,
                id = choice.id,
                text = escape(&choice.choice_text)
            ));
        }
        body.push_str("</fieldset>\n<input type=\"submit\" value=\"Vote\">\n</form>");
        layout(&self.question.question_text, urls, &body)
    }
}

impl Template for ResultsContext {
    fn render(&self, urls: &Urls) -> String {
        let items: String = self
            .choices
            .iter()
            .map(|choice| {
                format!(
                    "    <li>{} -- {} vote{}</li>\n",
                    escape(&choice.choice_text),
                    choice.votes,
                    if choice.votes == 1 { "" } else { "s" }
                )
            })
            .collect();
        let body = format!(
            "<h1>{}</h1>\n<ul>\n{}</ul>\n<a href=\"{}\">Vote again?</a>",
            escape(&self.question.question_text),
            items,
            escape(&urls.detail(self.question.id))
        );
        layout(&self.question.question_text, urls, &body)
    }
}

pub fn not_found() -> String {
    bare_page("Not Found", "<h1>Not Found</h1>\n<p>The requested resource was not found on this server.</p>")
}

pub fn bad_request() -> String {
    bare_page("Bad Request (400)", "<h1>Bad Request (400)</h1>")
}

pub fn server_error(detail: Option<&str>) -> String {
    match detail {
        Some(detail) => bare_page(
            "Server Error (500)",
            &format!("<h1>Server Error (500)</h1>\n<pre>{}</pre>", escape(detail)),
        ),
        None => bare_page("Server Error (500)", "<h1>Server Error (500)</h1>"),
    }
}

fn layout(title: &str, urls: &Urls, body: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n<title>{}</title>\n\
         <link rel=\"stylesheet\" href=\"{}\">\n</head>\n<body>\n{}\n</body>\n</html>\n",
        escape(title),
        escape(&urls.static_asset("polls/style.css")),
        body
    )
}

fn bare_page(title: &str, body: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n<title>{}</title>\n\
         </head>\n<body>\n{}\n</body>\n</html>\n",
        title, body
    )
}

/// Escapes text for HTML element content and quoted attribute values.
pub fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#x27;"),
            c => escaped.push(c),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn urls() -> Urls {
        Urls::new("/polls", "/static")
    }

    fn question(id: i64, text: &str) -> Question {
        Question {
            id,
            question_text: text.to_string(),
            pub_date: Utc::now(),
        }
    }

    #[test]
    fn escape_special_characters() {
        assert_eq!(
            escape(r#"<b>"Tom" & 'Jerry'</b>"#),
            "&lt;b&gt;&quot;Tom&quot; &amp; &#x27;Jerry&#x27;&lt;/b&gt;"
        );
        assert_eq!(escape("plain"), "plain");
    }

    #[test]
    fn empty_index_says_no_polls() {
        let html = IndexContext { latest_question_list: vec![] }.render(&urls());
        assert!(html.contains(NO_POLLS_AVAILABLE));
        assert!(!html.contains("<li>"));
    }

    #[test]
    fn index_links_questions() {
        let html = IndexContext {
            latest_question_list: vec![question(4, "Who's there?")],
        }
        .render(&urls());
        assert!(html.contains("<a href=\"/polls/4/\">Who&#x27;s there?</a>"));
        assert!(html.contains("/static/polls/style.css"));
        assert!(!html.contains(NO_POLLS_AVAILABLE));
    }

    #[test]
    fn detail_shows_error_and_choices() {
        let html = DetailContext {
            question: question(2, "Best <tag>?"),
            choices: vec![Choice {
                id: 9,
                question_id: 2,
                choice_text: "div".to_string(),
                votes: 0,
            }],
            error_message: Some(NO_CHOICE_SELECTED.to_string()),
        }
        .render(&urls());
        assert!(html.contains("You didn&#x27;t select a choice."));
        assert!(html.contains("Best &lt;tag&gt;?"));
        assert!(html.contains("action=\"/polls/2/vote/\""));
        assert!(html.contains("value=\"9\""));
    }

    #[test]
    fn results_pluralize_votes() {
        let choice = |id, votes| Choice {
            id,
            question_id: 1,
            choice_text: format!("C{}", id),
            votes,
        };
        let html = ResultsContext {
            question: question(1, "Q"),
            choices: vec![choice(1, 1), choice(2, 0), choice(3, 7)],
        }
        .render(&urls());
        assert!(html.contains("C1 -- 1 vote</li>"));
        assert!(html.contains("C2 -- 0 votes</li>"));
        assert!(html.contains("C3 -- 7 votes</li>"));
        assert!(html.contains("<a href=\"/polls/1/\">Vote again?</a>"));
    }

    #[test]
    fn render_keeps_context() {
        let context = IndexContext {
            latest_question_list: vec![question(1, "Q")],
        };
        let response = render(context, &urls());
        let stored = response.extensions().get::<IndexContext>().unwrap();
        assert_eq!(stored.latest_question_list.len(), 1);
    }
}
