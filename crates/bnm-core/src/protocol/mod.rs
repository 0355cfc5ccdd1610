//! The two request shapes built on top of [`CounterStore`].
//!
//! - `peek_and_reserve` + later `commit`: deferred commit, the number is written back only
//!   after the surrounding job succeeded.
//! - `atomic_increment`: one fetch, one conditional persist.
//!
//! Neither shape retries on conflict. Deferred commits re-fetch before writing and
//! overwrite whatever is stored for the id, so overlapping reservations of the same id
//! resolve as last commit wins.
use bnm_model::{CounterId, CounterMap, Reservation};
use tracing::{info, instrument};

use crate::{
    error::{CoreError, CoreResult},
    metrics::ReservationMode,
    store::CounterStore,
};

/// Compute the next reservation for `id` from a fetched map.
///
/// An absent id is issued `initial` (previous `initial - 1`); a present id with value `v`
/// is issued `v + 1` regardless of `initial`.
pub fn reserve(map: &CounterMap, id: &CounterId, initial: i64) -> CoreResult<Reservation> {
    let overflow = || CoreError::Overflow { id: id.to_string() };

    match map.get(id) {
        Some(previous) => Ok(Reservation {
            previous_number: previous,
            new_number: previous.checked_add(1).ok_or_else(overflow)?,
            created: false,
        }),
        None => Ok(Reservation {
            previous_number: initial.checked_sub(1).ok_or_else(overflow)?,
            new_number: initial,
            created: true,
        }),
    }
}

/// Build-number issuing protocol over a [`CounterStore`].
#[derive(Debug, Clone)]
pub struct CounterProtocol {
    store: CounterStore,
}

impl CounterProtocol {
    pub fn new(store: CounterStore) -> Self {
        Self { store }
    }

    /// Underlying store.
    pub fn store(&self) -> &CounterStore {
        &self.store
    }

    /// Compute the next number for `id` without writing anything.
    ///
    /// The caller is responsible for carrying `new_number` to [`CounterProtocol::commit`].
    #[instrument(level = "debug", skip(self, id), fields(id = %id))]
    pub async fn peek_and_reserve(&self, id: &CounterId, initial: i64) -> CoreResult<Reservation> {
        let snapshot = self.store.fetch().await?;
        let reservation = reserve(&snapshot.map, id, initial)?;

        self.store
            .metrics()
            .record_reservation(ReservationMode::Peek, reservation.created);
        info!(
            id = %id,
            previous = reservation.previous_number,
            new = reservation.new_number,
            created = reservation.created,
            "build number reserved (not committed)"
        );
        Ok(reservation)
    }

    /// Write `new_number` for `id`.
    ///
    /// Always re-fetches to obtain a current revision, then overwrites the stored value
    /// unconditionally. Only a writer landing between that fetch and the persist makes it fail.
    #[instrument(level = "debug", skip(self, id), fields(id = %id))]
    pub async fn commit(&self, id: &CounterId, new_number: i64) -> CoreResult<()> {
        let mut snapshot = self.store.fetch().await?;
        let replaced = snapshot.map.set(id, new_number);

        self.store
            .persist(&snapshot.map, snapshot.revision.as_ref())
            .await?;
        info!(id = %id, number = new_number, replaced = ?replaced, "build number committed");
        Ok(())
    }

    /// Compute the next number for `id` and persist it in a single fetch/persist cycle.
    #[instrument(level = "debug", skip(self, id), fields(id = %id))]
    pub async fn atomic_increment(&self, id: &CounterId, initial: i64) -> CoreResult<Reservation> {
        let mut snapshot = self.store.fetch().await?;
        let reservation = reserve(&snapshot.map, id, initial)?;

        snapshot.map.set(id, reservation.new_number);
        self.store
            .persist(&snapshot.map, snapshot.revision.as_ref())
            .await?;

        self.store
            .metrics()
            .record_reservation(ReservationMode::Increment, reservation.created);
        info!(
            id = %id,
            previous = reservation.previous_number,
            new = reservation.new_number,
            created = reservation.created,
            "build number incremented"
        );
        Ok(reservation)
    }
}
