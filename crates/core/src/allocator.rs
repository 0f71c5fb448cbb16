//! Identifier allocation: draw, check, commit.
//!
//! The allocator draws random candidates from the [`IdentifierSpace`],
//! consults the [`UsageLedger`] for uniqueness, and commits the winner. The
//! namespace is intentionally small (short URLs), so collisions are an
//! expected operating condition, not an error: below the configured
//! threshold they are retried silently; past it the allocator warns once
//! and, when the ledger has provably reached capacity, degrades to
//! accepting collisions — new uploads then overwrite an existing blob
//! instead of failing.
//!
//! The degraded path is never invisible: it is reported as
//! [`Allocation::Overwrote`], and an operator who would rather fail the
//! request can enable strict mode, which turns it into
//! [`DropError::Exhausted`](crate::DropError::Exhausted).

use crate::ledger::UsageLedger;
use crate::space::IdentifierSpace;
use crate::{DropError, DropResult};
use filedrop_types::Extension;

/// Outcome of a successful allocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Allocation {
    /// The identifier was unique at commit time.
    Fresh(String),
    /// The namespace was exhausted and the identifier collides with an
    /// existing record; the stored blob under it will be overwritten.
    Overwrote(String),
}

impl Allocation {
    /// The allocated identifier, regardless of outcome.
    pub fn identifier(&self) -> &str {
        match self {
            Allocation::Fresh(id) | Allocation::Overwrote(id) => id,
        }
    }

    /// Returns true if this allocation took the exhaustion fallback.
    pub fn is_overwrite(&self) -> bool {
        matches!(self, Allocation::Overwrote(_))
    }
}

/// Draws candidates and commits them against the ledger.
///
/// The allocator itself performs no locking; callers serialise
/// `allocate` (the service facade holds a mutex across it) so that the
/// check-then-insert sequence is atomic with respect to other requests.
#[derive(Debug, Clone)]
pub struct Allocator {
    space: IdentifierSpace,
    ledger: UsageLedger,
    collision_threshold: u32,
    strict_exhaustion: bool,
}

impl Allocator {
    /// Creates an allocator.
    ///
    /// # Errors
    ///
    /// Returns [`DropError::Validation`] if `collision_threshold` is zero.
    pub fn new(
        space: IdentifierSpace,
        ledger: UsageLedger,
        collision_threshold: u32,
        strict_exhaustion: bool,
    ) -> DropResult<Self> {
        if collision_threshold == 0 {
            return Err(DropError::Validation(
                "collision threshold must be at least 1".into(),
            ));
        }
        Ok(Self {
            space,
            ledger,
            collision_threshold,
            strict_exhaustion,
        })
    }

    /// Allocates an identifier for `extension`.
    ///
    /// Never returns [`Allocation::Fresh`] for an identifier that was taken
    /// at check time. Returns [`Allocation::Overwrote`] only after the
    /// collision counter has crossed the threshold and either the ledger
    /// holds at least as many records as the namespace has slots, or the
    /// retry cap below has been reached (a namespace that rejects that many
    /// consecutive draws is treated as exhausted).
    ///
    /// # Termination
    ///
    /// The collision counter increases monotonically. Crossing
    /// `collision_threshold` emits a one-time warning and arms the
    /// exhaustion check; reaching three times the threshold forces the
    /// exhaustion branch even if the full check has not tripped, so the
    /// loop is bounded in all states of the ledger.
    ///
    /// # Errors
    ///
    /// Ledger I/O failures propagate unchanged and are not retried here.
    /// [`DropError::Exhausted`](crate::DropError::Exhausted) is returned
    /// instead of `Overwrote` when strict mode is enabled.
    pub fn allocate(&self, extension: &Extension) -> DropResult<Allocation> {
        let capacity = self.space.capacity_per_extension()?;
        let retry_cap = self.collision_threshold.saturating_mul(3);
        let mut collisions: u32 = 0;
        let mut warned = false;

        loop {
            let candidate = self.space.random_candidate();

            if self.ledger.is_unique(&candidate)? {
                self.ledger.insert(&candidate, extension)?;
                return Ok(Allocation::Fresh(candidate));
            }

            collisions += 1;

            if collisions >= self.collision_threshold {
                if !warned {
                    tracing::warn!(
                        extension = %extension,
                        collisions,
                        "identifier namespace is densely populated; \
                         collisions will be accepted once it is full"
                    );
                    warned = true;
                }

                let full = u128::from(self.ledger.total_count()?) >= capacity;
                if full || collisions >= retry_cap {
                    if self.strict_exhaustion {
                        return Err(DropError::Exhausted {
                            extension: extension.clone(),
                        });
                    }
                    self.ledger.insert(&candidate, extension)?;
                    return Ok(Allocation::Overwrote(candidate));
                }
            }
        }
    }
}
