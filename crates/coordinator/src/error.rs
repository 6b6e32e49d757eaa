// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Coordinator-local error type, converted to the client-facing
//! [`OdcError`] taxonomy (§7) at the point each failure is known.

use odc_core::error::{ErrorCode, OdcError};
use odc_deploy::DeployError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoordinatorError {
    #[error("deployment layer error: {0}")]
    Deploy(#[from] DeployError),
    #[error("operation timed out")]
    Timeout,
    #[error("operation canceled")]
    Canceled,
}

impl CoordinatorError {
    /// Converts to an [`OdcError`], using `deploy_code` for the
    /// [`CoordinatorError::Deploy`] case (the right taxonomy code depends on
    /// which deployment-layer call failed, so the caller supplies it).
    pub fn into_odc_error(self, deploy_code: ErrorCode) -> OdcError {
        let msg = self.to_string();
        match self {
            CoordinatorError::Deploy(_) => OdcError::new(deploy_code, msg),
            CoordinatorError::Timeout => OdcError::new(ErrorCode::OperationTimeout, msg),
            CoordinatorError::Canceled => OdcError::new(ErrorCode::OperationCanceled, msg),
        }
    }
}
