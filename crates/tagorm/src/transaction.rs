//! Transaction state tracking over a driver transaction handle.
//!
//! ```ignore
//! orm.begin().await?;
//! orm.table("accounts").where_eq("uid", 1).update(Assignments::new().set("balance", 0)).await?;
//! orm.commit().await?;
//! ```

use crate::driver::{Driver, Transaction};
use crate::error::{OrmError, OrmResult};
use crate::trace;

/// Whether a transaction is open.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TxStatus {
    Idle,
    Active,
}

/// Idle, or Active holding the driver's transaction handle.
pub(crate) enum TxState<T> {
    Idle,
    Active(T),
}

impl<T> TxState<T> {
    pub(crate) fn status(&self) -> TxStatus {
        match self {
            TxState::Idle => TxStatus::Idle,
            TxState::Active(_) => TxStatus::Active,
        }
    }

    pub(crate) fn handle(&self) -> Option<&T> {
        match self {
            TxState::Idle => None,
            TxState::Active(tx) => Some(tx),
        }
    }

    /// Move to Idle, handing back the open handle if there was one.
    fn take(&mut self) -> Option<T> {
        match std::mem::replace(self, TxState::Idle) {
            TxState::Idle => None,
            TxState::Active(tx) => Some(tx),
        }
    }
}

impl<T: Transaction> TxState<T> {
    /// Idle → Active.
    pub(crate) async fn begin<D>(&mut self, driver: &D) -> OrmResult<()>
    where
        D: Driver<Transaction = T>,
    {
        if let TxState::Active(_) = self {
            return Err(OrmError::usage("a transaction is already active"));
        }
        let tx = driver.begin_transaction().await.map_err(|e| {
            let err = OrmError::driver("begin transaction", e);
            trace::driver_failure(&err);
            err
        })?;
        *self = TxState::Active(tx);
        trace::transaction("begin");
        Ok(())
    }

    /// Active → Idle, then commit. The state is Idle even if the commit fails.
    pub(crate) async fn commit(&mut self) -> OrmResult<()> {
        let tx = self
            .take()
            .ok_or_else(|| OrmError::usage("commit without an active transaction"))?;
        trace::transaction("commit");
        tx.commit().await.map_err(|e| {
            let err = OrmError::driver("commit", e);
            trace::driver_failure(&err);
            err
        })
    }

    /// Active → Idle, then roll back. The state is Idle even if the rollback fails.
    pub(crate) async fn rollback(&mut self) -> OrmResult<()> {
        let tx = self
            .take()
            .ok_or_else(|| OrmError::usage("rollback without an active transaction"))?;
        trace::transaction("rollback");
        tx.rollback().await.map_err(|e| {
            let err = OrmError::driver("rollback", e);
            trace::driver_failure(&err);
            err
        })
    }
}
