//! # Cart State
//!
//! Holds the cart being built at the register.
//!
//! The cart lives in a `tokio::sync::watch` channel: commands replace it
//! with the output of a pure `retreat_core::cart` function, and anything
//! displaying the cart subscribes and sees every committed version.
//!
//! ## Cart Operations Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Cart State Operations                                │
//! │                                                                         │
//! │  Operator Action          Command                 Cart State Change     │
//! │  ───────────────          ───────                 ─────────────────     │
//! │                                                                         │
//! │  Pick item ──────────────► add_item_to_cart() ──► cart::add_to_cart    │
//! │                                                                         │
//! │  Change quantity ────────► update_cart_quantity ► cart::update_quantity│
//! │                                                                         │
//! │  Remove line ────────────► remove_cart_item() ──► cart::remove_from_cart│
//! │                                                                         │
//! │  Checkout ───────────────► checkout() ──────────► reset (on success)   │
//! │                                                                         │
//! │  A failed transformation leaves the cart untouched and notifies no one.│
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use retreat_core::{CoreError, CoreResult, ReceiptData};
use tokio::sync::watch;

/// Register-managed cart state.
#[derive(Debug)]
pub struct CartState {
    tx: watch::Sender<ReceiptData>,
}

impl CartState {
    /// Creates a new empty cart state.
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(ReceiptData::new());
        CartState { tx }
    }

    /// Current cart.
    pub fn snapshot(&self) -> ReceiptData {
        self.tx.borrow().clone()
    }

    /// Receiver that observes every committed cart.
    pub fn subscribe(&self) -> watch::Receiver<ReceiptData> {
        self.tx.subscribe()
    }

    /// Applies a cart transformation and commits its result.
    ///
    /// Subscribers are only notified when `f` succeeds.
    ///
    /// ## Usage
    /// ```rust,ignore
    /// let cart = cart_state.update(|c| cart::add_to_cart(c, line))?;
    /// ```
    pub fn update<F>(&self, f: F) -> CoreResult<ReceiptData>
    where
        F: FnOnce(&ReceiptData) -> CoreResult<ReceiptData>,
    {
        let mut outcome = None;

        self.tx.send_if_modified(|cart| match f(cart) {
            Ok(next) => {
                *cart = next.clone();
                outcome = Some(Ok(next));
                true
            }
            Err(e) => {
                outcome = Some(Err(e));
                false
            }
        });

        outcome.unwrap_or_else(|| Err(CoreError::InvalidState("cart update did not run".into())))
    }

    /// Replaces the cart wholesale (e.g. with a resumed receipt).
    pub fn replace(&self, cart: ReceiptData) {
        self.tx.send_replace(cart);
    }

    /// Starts a fresh cart with a new id. Returns the new cart.
    pub fn reset(&self) -> ReceiptData {
        let fresh = ReceiptData::new();
        self.tx.send_replace(fresh.clone());
        fresh
    }
}

impl Default for CartState {
    fn default() -> Self {
        Self::new()
    }
}
