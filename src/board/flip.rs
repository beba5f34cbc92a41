//! The flip coordinator (§4.2-§4.6): the turn-phase dispatcher, first-card
//! acquisition, previous-move cleanup, and second-card resolution.
//!
//! Grounded on `engine::nl::engine::BettingEngineNL::apply_action`'s
//! phase-dispatch shape (match on the actor's current state, mutate, return)
//! and on `ledger::worker`'s pattern of re-acquiring a lock after an await
//! point and re-validating what it saw before the suspension.

use tokio::sync::Mutex;

use super::cell::{Cell, PlayerId, Position};
use super::errors::FlipError;
use super::BoardInner;

/// Drive one `flip(player, r, c)` call to completion, suspending on the
/// board's per-cell waiter queues whenever the target is held by another
/// player (§5 suspension point 1).
pub(super) async fn flip(
    board: &Mutex<BoardInner>,
    player_id: &PlayerId,
    pos: Position,
) -> Result<String, FlipError> {
    loop {
        let wait = {
            let mut inner = board.lock().await;

            if !inner.in_range(pos) {
                let state = inner.players.get_or_create(player_id).clone();
                if state.is_phase_b() {
                    relinquish_first(&mut inner, player_id, state.first.unwrap(), false);
                }
                return Err(FlipError::OutOfRange(pos));
            }

            let state = inner.players.get_or_create(player_id).clone();

            if state.is_phase_b() {
                return resolve_second(&mut inner, player_id, pos).map(|()| inner.snapshot(player_id));
            }

            if state.is_phase_c() {
                cleanup(&mut inner, player_id);
                let player = inner.players.get_or_create(player_id);
                player.first = None;
                player.second = None;
            } else {
                cleanup(&mut inner, player_id);
            }

            match try_acquire_first(&mut inner, player_id, pos) {
                Acquire::Done(result) => return result.map(|()| inner.snapshot(player_id)),
                Acquire::Wait(rx) => rx,
            }
        };

        // Lock is dropped here; suspend until the controller releases or the
        // cell is removed, then re-validate from the top of the loop (§5).
        let _ = wait.await;
    }
}

enum Acquire {
    Done(Result<(), FlipError>),
    Wait(tokio::sync::oneshot::Receiver<()>),
}

/// First-card acquisition, rules 1-A..1-D.
fn try_acquire_first(inner: &mut BoardInner, player_id: &PlayerId, pos: Position) -> Acquire {
    match inner.cell(pos) {
        Cell::Removed => Acquire::Done(Err(FlipError::NoCard(pos))),
        Cell::Present { controller, .. } => {
            let takeable = match controller {
                None => true,
                Some(holder) => holder == player_id,
            };
            if !takeable {
                return Acquire::Wait(inner.waiters.enqueue(pos));
            }

            let mut became_face_up = false;
            if let Cell::Present {
                face_up, controller, ..
            } = inner.cell_mut(pos)
            {
                *controller = Some(player_id.clone());
                if !*face_up {
                    *face_up = true;
                    became_face_up = true;
                }
            }
            if became_face_up {
                inner.changes.signal();
            }
            inner.players.get_or_create(player_id).first = Some(pos);
            Acquire::Done(Ok(()))
        }
    }
}

/// Previous-move cleanup, rules 3-A / 3-B.
fn cleanup(inner: &mut BoardInner, player_id: &PlayerId) {
    let (previous, matched) = {
        let state = inner.players.get_or_create(player_id);
        (std::mem::take(&mut state.previous), state.previous_matched)
    };
    if previous.is_empty() {
        inner.players.get_or_create(player_id).previous_matched = false;
        return;
    }

    let mut changed = false;
    if matched && previous.len() == 2 {
        for pos in &previous {
            inner.set_cell(*pos, Cell::Removed);
            inner.waiters.wake_all(*pos);
            changed = true;
        }
    } else {
        for pos in &previous {
            if let Cell::Present {
                face_up, controller, ..
            } = inner.cell_mut(*pos)
            {
                if *face_up && controller.is_none() {
                    *face_up = false;
                    changed = true;
                }
            }
        }
    }
    if changed {
        inner.changes.signal();
    }
    inner.players.get_or_create(player_id).previous_matched = false;
}

/// Release control of `first_pos`, waking its head waiter, and record it as
/// the sole entry of `previous` for the next cleanup (shared tail of rules
/// 2-A, 2-B, and the out-of-range defensive path).
fn relinquish_first(inner: &mut BoardInner, player_id: &PlayerId, first_pos: Position, matched: bool) {
    if let Cell::Present { controller, .. } = inner.cell_mut(first_pos) {
        *controller = None;
    }
    inner.waiters.wake_one(first_pos);
    let state = inner.players.get_or_create(player_id);
    state.first = None;
    state.second = None;
    state.previous = vec![first_pos];
    state.previous_matched = matched;
}

/// Second-card resolution, rules 2-A..2-E.
fn resolve_second(inner: &mut BoardInner, player_id: &PlayerId, pos: Position) -> Result<(), FlipError> {
    let first_pos = inner
        .players
        .get(player_id)
        .and_then(|p| p.first)
        .expect("phase B implies a held first card");

    match inner.cell(pos).clone() {
        Cell::Removed => {
            relinquish_first(inner, player_id, first_pos, false);
            Err(FlipError::NoCard(pos))
        }
        Cell::Present {
            controller: Some(_), ..
        } => {
            relinquish_first(inner, player_id, first_pos, false);
            Err(FlipError::Controlled(pos))
        }
        Cell::Present {
            face_up,
            value,
            controller: None,
        } => {
            if !face_up {
                if let Cell::Present { face_up, .. } = inner.cell_mut(pos) {
                    *face_up = true;
                }
                inner.changes.signal();
            }
            inner.players.get_or_create(player_id).second = Some(pos);

            let first_value = inner.cell(first_pos).value().map(str::to_string);
            if first_value.as_deref() == Some(value.as_str()) {
                if let Cell::Present { controller, .. } = inner.cell_mut(pos) {
                    *controller = Some(player_id.clone());
                }
                let state = inner.players.get_or_create(player_id);
                state.previous = vec![first_pos, pos];
                state.previous_matched = true;
            } else {
                if let Cell::Present { controller, .. } = inner.cell_mut(first_pos) {
                    *controller = None;
                }
                inner.waiters.wake_one(first_pos);
                let state = inner.players.get_or_create(player_id);
                state.previous = vec![first_pos, pos];
                state.previous_matched = false;
            }
            Ok(())
        }
    }
}
