//! ETL trace logs read through the Windows event tracing API.
//!
//! `drive` opens the log with `OpenTraceW` in event-record mode, runs the
//! blocking `ProcessTrace` call and closes the handle again on every path. The
//! sink reaches the callbacks through the log file's `Context` pointer, which
//! refers to a context on the stack of `drive` and so lives exactly as long as
//! the processing call.
//!
//! ETW offers no way to fail from the event callback itself. The first sink
//! error is stored in the context, later events are skipped, and the next
//! buffer callback returns FALSE so `ProcessTrace` stops. The stored error then
//! takes precedence over whatever status `ProcessTrace` returned.

use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::source::{TraceSink, TraceSource};

/// An `.etl` trace log on disk.
#[derive(Clone, Debug)]
pub struct EtlTraceSource {
    path: PathBuf,
}

impl EtlTraceSource {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }
}

#[cfg(not(windows))]
impl TraceSource for EtlTraceSource {
    fn drive(&mut self, _sink: &mut dyn TraceSink) -> Result<()> {
        Err(crate::error::Error::Unsupported {
            path: self.path.clone(),
        })
    }
}

#[cfg(windows)]
impl TraceSource for EtlTraceSource {
    fn drive(&mut self, sink: &mut dyn TraceSink) -> Result<()> {
        win::drive(&self.path, sink)
    }
}

#[cfg(windows)]
mod win {
    use std::ffi::c_void;
    use std::io;
    use std::iter;
    use std::mem;
    use std::os::windows::ffi::OsStrExt;
    use std::path::Path;
    use std::slice;

    use uuid::Uuid;
    use windows::core::{GUID, PWSTR};
    use windows::Win32::System::Diagnostics::Etw::{
        CloseTrace, OpenTraceW, ProcessTrace, EVENT_RECORD, EVENT_TRACE_LOGFILEW,
        PROCESSTRACE_HANDLE, PROCESS_TRACE_MODE_EVENT_RECORD,
    };

    use crate::error::{Error, Result, TraceOpenKind};
    use crate::source::TraceSink;
    use crate::trace::RawEventRecord;

    const ERROR_SUCCESS: u32 = 0;
    /// Status reported by `OpenTraceW` for a damaged log file.
    const ERROR_FILE_CORRUPT: u32 = 1392;
    /// Status returned by `ProcessTrace` when a buffer callback asked it to stop.
    const ERROR_CANCELLED: u32 = 1223;

    // INVALID_HANDLE_VALUE widened to 64 bits, for 64 and 32 bit processes.
    const INVALID_TRACE_HANDLES: [u64; 2] = [u64::MAX, 0x0000_0000_FFFF_FFFF];

    struct DriveContext<'a> {
        sink: &'a mut dyn TraceSink,
        error: Option<Error>,
        stop_requested: bool,
    }

    /// Closes the trace handle when dropped.
    struct TraceHandleGuard(PROCESSTRACE_HANDLE);

    impl Drop for TraceHandleGuard {
        fn drop(&mut self) {
            let status = unsafe { CloseTrace(self.0) };
            if status.0 != ERROR_SUCCESS {
                tracing::warn!(status = status.0, "CloseTrace failed");
            }
        }
    }

    fn guid_to_uuid(guid: &GUID) -> Uuid {
        Uuid::from_fields(guid.data1, guid.data2, guid.data3, &guid.data4)
    }

    unsafe extern "system" fn event_record_callback(record: *mut EVENT_RECORD) {
        let Some(record) = record.as_ref() else {
            return;
        };
        let Some(context) = (record.UserContext as *mut DriveContext<'_>).as_mut() else {
            return;
        };
        if context.error.is_some() || context.stop_requested {
            return;
        }

        let payload = if record.UserData.is_null() || record.UserDataLength == 0 {
            &[][..]
        } else {
            slice::from_raw_parts(
                record.UserData as *const u8,
                record.UserDataLength as usize,
            )
        };

        let raw = RawEventRecord {
            provider_id: guid_to_uuid(&record.EventHeader.ProviderId),
            event_id: record.EventHeader.EventDescriptor.Id,
            timestamp: record.EventHeader.TimeStamp,
            payload,
        };

        if let Err(err) = context.sink.on_event(&raw) {
            tracing::warn!(error = %err, "stopping trace processing after sink error");
            context.error = Some(err);
        }
    }

    unsafe extern "system" fn buffer_callback(logfile: *mut EVENT_TRACE_LOGFILEW) -> u32 {
        let Some(logfile) = logfile.as_ref() else {
            return 1;
        };
        let Some(context) = (logfile.Context as *mut DriveContext<'_>).as_mut() else {
            return 1;
        };
        if context.error.is_some() {
            return 0;
        }
        if !context.sink.on_buffer() {
            context.stop_requested = true;
            return 0;
        }
        1
    }

    pub(super) fn drive(path: &Path, sink: &mut dyn TraceSink) -> Result<()> {
        let mut wide_path: Vec<u16> = path
            .as_os_str()
            .encode_wide()
            .chain(iter::once(0))
            .collect();

        let mut context = DriveContext {
            sink,
            error: None,
            stop_requested: false,
        };
        let context_ptr = &mut context as *mut DriveContext<'_> as *mut c_void;

        let mut logfile: EVENT_TRACE_LOGFILEW = unsafe { mem::zeroed() };
        logfile.LogFileName = PWSTR(wide_path.as_mut_ptr());
        logfile.Anonymous1.ProcessTraceMode = PROCESS_TRACE_MODE_EVENT_RECORD;
        logfile.BufferCallback = Some(buffer_callback);
        logfile.Anonymous2.EventRecordCallback = Some(event_record_callback);
        logfile.Context = context_ptr;

        let handle = unsafe { OpenTraceW(&mut logfile) };
        if INVALID_TRACE_HANDLES.contains(&handle.Value) {
            let code = io::Error::last_os_error().raw_os_error().unwrap_or(0) as u32;
            let kind = if code == ERROR_FILE_CORRUPT {
                TraceOpenKind::Corrupt
            } else {
                TraceOpenKind::Other
            };
            return Err(Error::TraceOpen {
                path: path.to_path_buf(),
                kind,
                code,
            });
        }
        tracing::debug!(path = %path.display(), "opened trace log");

        let status = {
            let guard = TraceHandleGuard(handle);
            unsafe { ProcessTrace(&[guard.0], None, None) }
        };

        if let Some(err) = context.error.take() {
            return Err(err);
        }
        match status.0 {
            ERROR_SUCCESS => Ok(()),
            ERROR_CANCELLED if context.stop_requested => Ok(()),
            code => Err(Error::TraceProcessing {
                path: path.to_path_buf(),
                code,
            }),
        }
    }
}
