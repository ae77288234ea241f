//! Tracker event macros
//!
//! Every `Tracker` operation (`track`, `forget`, `changes`) is bracketed by a
//! `start` event and either an `end` or an `end_error` event. Each event
//! carries `component`, `op` and `event`; the caller appends record details
//! such as `record_type`, `field_count`, `change_count` or `removed`.
//!
//! Start and end events go out at debug level because they fire on every
//! diff. Failures go out at error level with the error's kind, stable code
//! and message.

/// Emit one operation event at `$level`. Shared by the public macros.
#[doc(hidden)]
#[macro_export]
macro_rules! __log_op_event {
    ($level:expr, $op:expr, $event:expr $(, $($field:tt)*)?) => {
        tracing::event!(
            $level,
            component = module_path!(),
            op = $op,
            event = $event,
            $($($field)*)?
        )
    };
}

/// Record that a tracker operation began on a record.
///
/// ```
/// # use dirty_core::log_op_start;
/// log_op_start!("track");
/// log_op_start!("track", record_type = "app::User");
/// ```
#[macro_export]
macro_rules! log_op_start {
    ($op:expr $(, $($field:tt)*)?) => {
        $crate::__log_op_event!(
            tracing::Level::DEBUG,
            $op,
            $crate::schema::EVENT_START
            $(, $($field)*)?
        )
    };
}

/// Record that a tracker operation finished. `duration_ms` comes first so
/// every end event has it.
///
/// ```
/// # use dirty_core::log_op_end;
/// log_op_end!("changes", duration_ms = 0);
/// log_op_end!("changes", duration_ms = 0, field_count = 4, change_count = 2);
/// ```
#[macro_export]
macro_rules! log_op_end {
    ($op:expr, duration_ms = $duration:expr $(, $($field:tt)*)?) => {
        $crate::__log_op_event!(
            tracing::Level::DEBUG,
            $op,
            $crate::schema::EVENT_END,
            duration_ms = $duration
            $(, $($field)*)?
        )
    };
}

/// Record that a tracker operation failed.
///
/// `$err` is anything convertible into [`ExError`](crate::errors::ExError),
/// normally a [`DirtyError`](crate::errors::DirtyError). The event gets
/// `err.kind`, `err.code` and `err.message`.
///
/// ```
/// # use dirty_core::{log_op_error, errors::DirtyError};
/// let err = DirtyError::NotTracked { record_type: "app::User", address: 0x10 };
/// log_op_error!("changes", err, duration_ms = 0, record_type = "app::User");
/// ```
#[macro_export]
macro_rules! log_op_error {
    ($op:expr, $err:expr, duration_ms = $duration:expr $(, $($field:tt)*)?) => {{
        let ex_err: $crate::errors::ExError = $err.into();
        $crate::__log_op_event!(
            tracing::Level::ERROR,
            $op,
            $crate::schema::EVENT_END_ERROR,
            duration_ms = $duration,
            err.kind = ?ex_err.kind(),
            err.code = ex_err.code(),
            err.message = %ex_err.message()
            $(, $($field)*)?
        )
    }};
}
