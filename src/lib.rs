//! DBSmart - AI-assisted database design dashboard
//!
//! DBSmart turns entity-relationship diagrams into SQL schemas, SQL schemas
//! back into Mermaid ER diagrams, and reviews schemas for optimization
//! opportunities. The heavy lifting is done by a generative-AI service; this
//! crate builds the prompts, parses the replies, and keeps the dashboard state.
//!
//! # Operations
//!
//! 1. **Generate SQL** (ER view): an uploaded diagram image, an uploaded text
//!    file, or typed text becomes a `CREATE TABLE` script.
//!
//! 2. **Generate ER** (SQL view): the schema becomes `erDiagram` source that the
//!    page renders with Mermaid.
//!
//! 3. **Optimize** (AI view): the schema is reviewed and comes back as a list of
//!    categorized suggestions with a severity each.
//!
//! # Quick Start
//!
//! ```no_run
//! use dbsmart::{Config, Dashboard, GeminiClient, Operation};
//!
//! let client = GeminiClient::new(&Config::from_env())?;
//! let mut dashboard = Dashboard::new();
//!
//! dashboard.set_schema("CREATE TABLE users (id INT PRIMARY KEY, email TEXT);");
//! dashboard.run(Operation::Optimize, &client)?;
//!
//! for s in dashboard.suggestions() {
//!     println!("[{}] {}", s.severity, s.text);
//! }
//! println!("Score: {}/100", dashboard.score());
//! # Ok::<(), dbsmart::Error>(())
//! ```
//!
//! # Scoring System
//!
//! Every suggestion deducts from 100 by severity:
//!
//! | Severity | Deduction |
//! |----------|-----------|
//! | Critical | 15 |
//! | Moderate | 5 |
//! | Good Practice | 0 |
//!
//! An empty suggestion list scores 0 (nothing has been analyzed yet).
//!
//! # Modules
//!
//! - [`ai`]: prompt building, reply parsing, and the Gemini client
//! - [`dashboard`]: per-session state and the single-flight operation guard
//! - [`export`]: file content for the active view
//! - [`report`]: Output formatters (HTML, JSON, CSV)
//! - [`serve`]: the browser dashboard

pub mod ai;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod export;
pub mod model;
pub mod report;
pub mod score;
pub mod serve;

pub use ai::gemini::GeminiClient;
pub use ai::{CompletionService, Operation};
pub use config::Config;
pub use dashboard::Dashboard;
pub use error::{Error, Result};
pub use model::{Category, InputArtifact, Severity, Suggestion, Theme, UploadedFile, View};
pub use score::score;
