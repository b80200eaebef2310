//! Order Pad core: sales order entry for ERPNext-compatible backends.
//!
//! The crate models one order entry screen. [`OrderDraft`] keeps the form
//! state with every field as the raw typed string, [`OrderSession`] wraps
//! it with the row operations, the [`ReferenceCatalog`] of known customers
//! and items, and the submission pipeline. [`RestGateway`] talks to the
//! ERP's `/api/resource/{DocType}` REST interface with token auth; the
//! [`ErpGateway`] trait keeps the pipeline testable without a server.
//!
//! A typical flow:
//!
//! ```no_run
//! use chrono::Local;
//! use order_pad::{DraftOptions, ErpConfig, LineField, OrderSession, RestGateway};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ErpConfig::from_env()?;
//! let gateway = RestGateway::new(config.clone())?;
//! let mut session = OrderSession::new(config, DraftOptions::default());
//!
//! session.load_catalog(&gateway).await?;
//! session.set_customer("Acme Wholesale");
//! session.update_line_item(0, LineField::ItemCode, "ITEM-01")?;
//! session.update_line_item(0, LineField::Qty, "3")?;
//!
//! let result = session.submit(&gateway, Local::now().date_naive()).await;
//! println!("{}", result.message);
//! # Ok(())
//! # }
//! ```

mod api;
mod catalog;
mod config;
mod draft;
mod error;
mod gateway;
mod session;

pub use api::{ConnectivityResult, RestGateway};
pub use catalog::{CustomerRef, ItemRef, ReferenceCatalog};
pub use config::{DraftOptions, ErpConfig, DEFAULT_LIST_LIMIT};
pub use draft::{LineField, LineItem, NormalizedDraft, NormalizedLine, OrderDraft};
pub use error::{ApiError, DraftError, SubmitError, ValidationError};
pub use gateway::{ErpGateway, NewItem, RecordRef, SalesOrderItem, SalesOrderPayload};
pub use session::{OrderSession, SubmissionResult};
