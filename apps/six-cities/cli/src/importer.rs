//! Loads offers from a TSV file into the database.

use domain_offers::import::parse_lines;
use domain_offers::{OfferRepository, OfferService};
use domain_users::{UserRepository, UserService};
use thiserror::Error;
use tracing::{info, warn};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error(transparent)]
    Users(#[from] domain_users::UserError),

    #[error(transparent)]
    Offers(#[from] domain_offers::OfferError),
}

/// Outcome of one import run
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ImportSummary {
    pub imported: usize,
    pub failed: usize,
}

pub struct OfferImporter<O: OfferRepository, U: UserRepository> {
    offers: OfferService<O>,
    users: UserService<U>,
    default_password: String,
}

impl<O: OfferRepository, U: UserRepository> OfferImporter<O, U> {
    /// Authors that do not exist yet are created with `default_password`
    pub fn new(offers: OfferService<O>, users: UserService<U>, default_password: String) -> Self {
        Self {
            offers,
            users,
            default_password,
        }
    }

    /// Import every line of `content`. Bad lines are logged with their
    /// number and counted, never fatal.
    pub async fn import(&self, content: &str) -> ImportSummary {
        let mut summary = ImportSummary::default();

        for (line, parsed) in parse_lines(content) {
            let imported = match parsed {
                Ok(imported) => imported,
                Err(e) => {
                    warn!(line, error = %e, "Skipping malformed line");
                    summary.failed += 1;
                    continue;
                }
            };

            match self.store(imported).await {
                Ok(()) => summary.imported += 1,
                Err(e) => {
                    warn!(line, error = %e, "Failed to store offer");
                    summary.failed += 1;
                }
            }
        }

        info!(
            imported = summary.imported,
            failed = summary.failed,
            "Import finished"
        );
        summary
    }

    async fn store(&self, imported: domain_offers::ImportedOffer) -> Result<(), StoreError> {
        let author = self
            .users
            .find_or_create(imported.author, &self.default_password)
            .await?;
        self.offers.create(author.id, imported.offer).await?;
        Ok(())
    }
}
