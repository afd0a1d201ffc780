//! Form page rendering and submission handling.
//!
//! `GET /` renders the single-page form with the thirteen numeric inputs;
//! `POST /predict` consumes the submitted values, calls the predictor, and
//! re-renders the page with a styled result card. Each submission is an
//! independent, stateless request-response cycle.

use std::collections::HashMap;
use std::sync::Arc;

use axum::extract::rejection::FormRejection;
use axum::extract::{Form, State};
use axum::response::Html;
use cardioscope_core::{ServerConfig, Verdict, FIELDS, VALIDATION_MESSAGE};
use cardioscope_model::Predictor;
use tracing::warn;

// ---------------------------------------------------------------------------
// Shared application state
// ---------------------------------------------------------------------------

/// Shared state threaded through axum handlers via [`State`].
///
/// Constructed once before serving begins and never mutated; the predictor
/// inside is safe for concurrent read-only use.
pub struct AppState {
    /// Server configuration.
    pub config: ServerConfig,
    /// Loaded classifier behind its error boundary.
    pub predictor: Predictor,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// Outcome block rendered under the form after a submission.
enum PageResult {
    Verdict(Verdict),
    ValidationError,
}

/// `GET /` — the blank form with every field at its default.
pub async fn index_handler(State(_state): State<Arc<AppState>>) -> Html<String> {
    Html(render_page(None))
}

/// `POST /predict` — score a form submission and re-render the page.
///
/// Any failure — a malformed body, a missing field, a value that does not
/// coerce — renders the same generic validation card; causes are logged but
/// never shown to the user.
pub async fn predict_handler(
    State(state): State<Arc<AppState>>,
    form: Result<Form<HashMap<String, String>>, FormRejection>,
) -> Html<String> {
    let result = match form {
        Ok(Form(fields)) => match state.predictor.predict_raw(&fields) {
            Ok(verdict) => PageResult::Verdict(verdict),
            Err(err) => {
                warn!(%err, "Rejected form submission");
                PageResult::ValidationError
            }
        },
        Err(rejection) => {
            warn!(%rejection, "Malformed form body");
            PageResult::ValidationError
        }
    };
    Html(render_page(Some(result)))
}

// ---------------------------------------------------------------------------
// Rendering
// ---------------------------------------------------------------------------

/// Page styling, carried over from the original UI.
const STYLE: &str = r#"
        body {
            margin: 0;
            font-family: "Segoe UI", Arial, sans-serif;
            background: linear-gradient(to right, #ccefff, #99e6ff);
            color: #000000;
        }
        main {
            max-width: 960px;
            margin: 0 auto;
            padding: 30px 20px;
        }
        label {
            display: block;
            margin-bottom: 4px;
            font-weight: 600;
        }
        .form-card {
            background-color: #ffffff;
            padding: 30px;
            border-radius: 15px;
            box-shadow: 0 6px 20px rgba(0,0,0,0.15);
            margin-bottom: 30px;
        }
        .form-grid {
            display: grid;
            grid-template-columns: repeat(3, 1fr);
            gap: 14px 24px;
        }
        .form-grid input {
            border: 1px solid #ccc;
            border-radius: 10px;
            padding: 10px;
            width: 100%;
            box-sizing: border-box;
            background-color: #ffffff;
            color: #000000;
        }
        button {
            margin-top: 20px;
            background-color: #007acc;
            color: white;
            border: none;
            padding: 12px 30px;
            border-radius: 10px;
            font-size: 18px;
            font-weight: bold;
            cursor: pointer;
        }
        button:hover {
            background-color: #005f99;
        }
        .result-card {
            padding: 20px;
            border-radius: 12px;
            text-align: center;
            font-size: 22px;
            font-weight: bold;
            margin-top: 20px;
        }
        .positive {
            background-color: #ffe5e5;
            color: #d9534f;
        }
        .negative {
            background-color: #e5ffe5;
            color: #28a745;
        }
        .error {
            background-color: #fff3cd;
            color: #856404;
        }
"#;

/// Render the full page, optionally with a result card under the form.
fn render_page(result: Option<PageResult>) -> String {
    let mut inputs = String::new();
    for field in &FIELDS {
        inputs.push_str(&format!(
            concat!(
                "<div class=\"field\">\n",
                "<label for=\"{name}\">{label}</label>\n",
                "<input type=\"number\" id=\"{name}\" name=\"{name}\" ",
                "min=\"{min}\" max=\"{max}\" step=\"{step}\" value=\"{default}\" required>\n",
                "</div>\n"
            ),
            name = field.name,
            label = field.label,
            min = field.min,
            max = field.max,
            step = field.step,
            default = field.default,
        ));
    }

    let result_card = match result {
        None => String::new(),
        Some(PageResult::Verdict(verdict)) => {
            let class = if verdict.is_positive() {
                "positive"
            } else {
                "negative"
            };
            format!(
                "<div class=\"result-card {}\">{}</div>\n",
                class,
                verdict.message()
            )
        }
        Some(PageResult::ValidationError) => format!(
            "<div class=\"result-card error\">{}</div>\n",
            VALIDATION_MESSAGE
        ),
    };

    format!(
        concat!(
            "<!DOCTYPE html>\n",
            "<html lang=\"en\">\n",
            "<head>\n",
            "<meta charset=\"utf-8\">\n",
            "<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n",
            "<title>Heart Disease Predictor</title>\n",
            "<style>{style}</style>\n",
            "</head>\n",
            "<body>\n",
            "<main>\n",
            "<h1>&#x2764;&#xFE0F; Heart Disease Predictor</h1>\n",
            "<p>Enter your details below to check your heart disease risk:</p>\n",
            "<form class=\"form-card\" method=\"post\" action=\"/predict\">\n",
            "<div class=\"form-grid\">\n",
            "{inputs}",
            "</div>\n",
            "<button type=\"submit\">Predict Heart Disease</button>\n",
            "</form>\n",
            "{result_card}",
            "</main>\n",
            "</body>\n",
            "</html>\n"
        ),
        style = STYLE,
        inputs = inputs,
        result_card = result_card,
    )
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
