mod conflict;
mod error;
mod mutations;
mod queries;
mod store;

pub use conflict::{ALREADY_BOOKED_REASON, NOT_AVAILABLE_REASON};
pub use error::EngineError;
pub use mutations::{DEFAULT_USER_ID, NewAmenity, NewBooking, NewVenue};
pub use queries::{PopularFilter, PopularSort};
pub use store::InMemoryStore;

use std::io;
use std::path::PathBuf;
use std::sync::Arc;

use tokio::sync::{RwLock, mpsc, oneshot};
use tracing::{info, warn};
use ulid::Ulid;

use crate::model::*;
use crate::rules::{BookingPolicy, TimeReference};
use crate::wal::Wal;

pub type SharedVenue = Arc<RwLock<Venue>>;

/// The booking rules an engine enforces: the start-date policy and the
/// time zone its day boundaries are drawn in.
#[derive(Debug, Clone, Default)]
pub struct BookingRules {
    pub policy: BookingPolicy,
    pub time: TimeReference,
}

// ── Group-commit WAL channel ─────────────────────────────

pub(super) enum WalCommand {
    Append {
        event: Event,
        response: oneshot::Sender<io::Result<()>>,
    },
    Compact {
        events: Vec<Event>,
        response: oneshot::Sender<io::Result<()>>,
    },
    AppendsSinceCompact {
        response: oneshot::Sender<u64>,
    },
}

/// Background task that owns the WAL and batches appends for group commit.
/// 1. Block until the first Append arrives.
/// 2. Buffer it (no fsync).
/// 3. Drain all immediately available Appends (the batch window).
/// 4. Single flush_sync for the whole batch.
/// 5. Respond Ok to all senders.
async fn wal_writer_loop(mut wal: Wal, mut rx: mpsc::Receiver<WalCommand>) {
    while let Some(cmd) = rx.recv().await {
        match cmd {
            WalCommand::Append { event, response } => {
                let mut batch = vec![(event, response)];

                loop {
                    match rx.try_recv() {
                        Ok(WalCommand::Append { event, response }) => {
                            batch.push((event, response));
                        }
                        Ok(other) => {
                            // Flush current batch first, then handle the non-append command
                            commit_batch(&mut wal, &mut batch);
                            handle_non_append(&mut wal, other);
                            break;
                        }
                        Err(_) => break,
                    }
                }

                if !batch.is_empty() {
                    commit_batch(&mut wal, &mut batch);
                }
            }
            other => handle_non_append(&mut wal, other),
        }
    }
}

fn commit_batch(wal: &mut Wal, batch: &mut Vec<(Event, oneshot::Sender<io::Result<()>>)>) {
    metrics::histogram!(crate::observability::WAL_FLUSH_BATCH_SIZE).record(batch.len() as f64);
    let flush_start = std::time::Instant::now();
    let result = flush_batch(wal, batch);
    metrics::histogram!(crate::observability::WAL_FLUSH_DURATION_SECONDS)
        .record(flush_start.elapsed().as_secs_f64());
    respond_batch(batch, &result);
}

fn flush_batch(wal: &mut Wal, batch: &mut [(Event, oneshot::Sender<io::Result<()>>)]) -> io::Result<()> {
    let mut append_err: Option<io::Error> = None;
    for (event, _) in batch.iter() {
        if let Err(e) = wal.append_buffered(event) {
            append_err = Some(e);
            break;
        }
    }
    // Always flush, even on append error, so partially buffered bytes
    // don't leak into the next batch (callers were told this batch failed).
    let flush_err = wal.flush_sync().err();
    if let Some(e) = append_err {
        return Err(e);
    }
    if let Some(e) = flush_err {
        return Err(e);
    }
    Ok(())
}

fn respond_batch(batch: &mut Vec<(Event, oneshot::Sender<io::Result<()>>)>, result: &io::Result<()>) {
    for (_, tx) in batch.drain(..) {
        let r = match result {
            Ok(()) => Ok(()),
            Err(e) => Err(io::Error::new(e.kind(), e.to_string())),
        };
        let _ = tx.send(r);
    }
}

fn handle_non_append(wal: &mut Wal, cmd: WalCommand) {
    match cmd {
        WalCommand::Compact { events, response } => {
            let result = Wal::write_compact_file(wal.path(), &events)
                .and_then(|()| wal.swap_compact_file());
            let _ = response.send(result);
        }
        WalCommand::AppendsSinceCompact { response } => {
            let _ = response.send(wal.appends_since_compact());
        }
        WalCommand::Append { .. } => unreachable!(),
    }
}

pub struct Engine {
    pub store: InMemoryStore,
    pub rules: BookingRules,
    pub(super) wal_tx: mpsc::Sender<WalCommand>,
    /// Mutations hold this shared for their whole run; compaction holds it
    /// exclusively so the snapshot it writes cannot miss an append.
    pub(super) commit_gate: RwLock<()>,
    /// Serializes amenity inserts so the unique-name check cannot race.
    pub(super) amenity_lock: tokio::sync::Mutex<()>,
}

impl Engine {
    pub fn new(wal_path: PathBuf, rules: BookingRules) -> std::io::Result<Self> {
        let events = Wal::replay(&wal_path)?;
        let wal = Wal::open(&wal_path)?;
        let (wal_tx, wal_rx) = mpsc::channel(4096);
        tokio::spawn(wal_writer_loop(wal, wal_rx));

        let engine = Self {
            store: InMemoryStore::new(),
            rules,
            wal_tx,
            commit_gate: RwLock::new(()),
            amenity_lock: tokio::sync::Mutex::new(()),
        };

        // Replay events. We're the sole owner of these Arcs, so try_read/try_write
        // always succeed instantly (no contention). Never use blocking_read/blocking_write
        // here because this may run inside an async context.
        for event in &events {
            match event {
                Event::VenueCreated { venue } => {
                    engine
                        .store
                        .insert_venue(venue.id, Arc::new(RwLock::new(venue.clone())));
                }
                Event::AmenityAdded { amenity } => engine.store.insert_amenity(amenity.clone()),
                other => {
                    let Some(venue_id) = other.venue_id() else { continue };
                    match engine.store.get_venue(&venue_id) {
                        Some(venue) => {
                            let mut guard = venue.try_write().expect("replay: uncontended write");
                            engine.store.apply_to_venue(&mut guard, other);
                        }
                        None => warn!(%venue_id, "replay: event for unknown venue skipped"),
                    }
                }
            }
        }

        let faults: usize = engine
            .store
            .venue_handles()
            .iter()
            .map(|venue| {
                let guard = venue.try_read().expect("replay: uncontended read");
                let bookings = engine.store.bookings_for_venue(&guard.id);
                conflict::integrity_faults(&guard, &bookings).len()
            })
            .sum();

        info!(
            events = events.len(),
            venues = engine.store.venue_count(),
            bookings = engine.store.booking_count(),
            faults,
            "engine state restored"
        );
        Ok(engine)
    }

    /// Write event to WAL via the background group-commit writer.
    async fn wal_append(&self, event: &Event) -> Result<(), EngineError> {
        let (tx, rx) = oneshot::channel();
        self.wal_tx
            .send(WalCommand::Append {
                event: event.clone(),
                response: tx,
            })
            .await
            .map_err(|_| EngineError::WalError("WAL writer shut down".into()))?;
        rx.await
            .map_err(|_| EngineError::WalError("WAL writer dropped response".into()))?
            .map_err(|e| EngineError::WalError(e.to_string()))
    }

    pub fn get_venue_handle(&self, id: &Ulid) -> Option<SharedVenue> {
        self.store.get_venue(id)
    }

    /// The one commit path for booking changes: WAL-append, then apply to
    /// the booking store and the venue calendar together. The caller holds
    /// the venue's write lock and the commit gate.
    pub(super) async fn persist_and_apply(
        &self,
        venue: &mut Venue,
        event: &Event,
    ) -> Result<(), EngineError> {
        self.wal_append(event).await?;
        self.store.apply_to_venue(venue, event);
        Ok(())
    }

    /// Booking → venue lookup, acquire the venue's write lock, and re-read
    /// the booking under it.
    pub(super) async fn resolve_booking_write(
        &self,
        booking_id: &Ulid,
    ) -> Result<(Booking, tokio::sync::OwnedRwLockWriteGuard<Venue>), EngineError> {
        let venue_id = self
            .store
            .booking(booking_id)
            .ok_or(EngineError::NotFound("Booking"))?
            .venue_id;
        let venue = self
            .store
            .get_venue(&venue_id)
            .ok_or(EngineError::NotFound("Venue"))?;
        let guard = venue.write_owned().await;
        let booking = self
            .store
            .booking(booking_id)
            .ok_or(EngineError::NotFound("Booking"))?;
        Ok((booking, guard))
    }

    /// Today's date in the engine's reference zone.
    pub fn today(&self) -> chrono::NaiveDate {
        self.rules.time.today(conflict::now())
    }
}
