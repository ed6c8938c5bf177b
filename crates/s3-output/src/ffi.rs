// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! C-ABI entry points for hosts that load the plugin as a shared library.
//!
//! ## Lifecycle
//!
//! ```c
//! S3OutputRegistration reg;
//! s3_output_register(&reg);                  // name + description
//!
//! S3OutputOptions opts = { .region = "us-east-1", .bucket = "my-logs",
//!                          .prefix = "fluent", .gzip = "true" };
//! int64_t handle = s3_output_init(&opts);    // -1 on error
//!
//! int status = s3_output_flush(handle, data, len, "app");  // once per batch
//!
//! s3_output_exit(handle);
//! ```
//!
//! `s3_output_flush` takes the MessagePack-encoded batch exactly as the host
//! delivers it and returns `FLB_OK` (1), or `FLB_RETRY` (2) when the upload
//! failed and the batch should be redelivered. `FLB_ERROR` (0) is only
//! returned for invalid calls: null pointers or unknown handles.
//!
//! ## Thread Safety
//!
//! Different handles may be used from different threads concurrently. One
//! handle must not be used from two threads at the same time.
//!
//! ## Panic Safety
//!
//! Every entry point runs inside `catch_unwind`; a panic is reported as
//! `FLB_ERROR` (or `-1` from `s3_output_init`) instead of unwinding into the
//! host.

use crate::constants::{FLB_ERROR, FLB_OK};
use crate::logger;
use crate::plugin::{OutputPlugin, PluginHandle, Registry};
use std::ffi::CStr;
use std::os::raw::{c_char, c_int};
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::{Mutex, OnceLock};
use tracing::error;

static PLUGIN_NAME_C: &CStr = c"s3";
static PLUGIN_DESCRIPTION_C: &CStr = c"Amazon S3 Fluent Bit Plugin.";

/// Filled in by [`s3_output_register`]. Both strings are static.
#[repr(C)]
pub struct S3OutputRegistration {
    pub name: *const c_char,
    pub description: *const c_char,
}

/// Configuration passed to [`s3_output_init`].
///
/// All fields are null-terminated UTF-8 strings; NULL means "not set".
#[repr(C)]
pub struct S3OutputOptions {
    /// AWS region (required)
    pub region: *const c_char,
    /// Destination bucket (required)
    pub bucket: *const c_char,
    /// Key prefix, default empty
    pub prefix: *const c_char,
    /// "true" or "false", default "true"
    pub gzip: *const c_char,
}

fn registry() -> &'static Mutex<Registry> {
    static REGISTRY: OnceLock<Mutex<Registry>> = OnceLock::new();
    REGISTRY.get_or_init(|| Mutex::new(Registry::new()))
}

/// Reads an optional C string. `Err` means the bytes are not valid UTF-8.
///
/// # Safety
/// `ptr` must be NULL or point to a null-terminated string.
unsafe fn cstr_to_option(ptr: *const c_char) -> Result<Option<String>, ()> {
    if ptr.is_null() {
        return Ok(None);
    }
    CStr::from_ptr(ptr)
        .to_str()
        .map(|s| Some(s.to_string()))
        .map_err(|_| ())
}

fn handle_from_raw(handle: i64) -> Option<PluginHandle> {
    u64::try_from(handle).ok().map(PluginHandle::from_raw)
}

/// Reports the plugin name and description.
///
/// # Safety
/// `registration` must be NULL or point to writable memory for a
/// `S3OutputRegistration`.
#[no_mangle]
pub unsafe extern "C" fn s3_output_register(registration: *mut S3OutputRegistration) -> c_int {
    if registration.is_null() {
        return FLB_ERROR;
    }
    (*registration).name = PLUGIN_NAME_C.as_ptr();
    (*registration).description = PLUGIN_DESCRIPTION_C.as_ptr();
    FLB_OK
}

/// Creates an instance and returns its handle, or -1 on error.
///
/// # Safety
/// `options` must be NULL or point to a valid `S3OutputOptions` whose string
/// fields are NULL or null-terminated.
#[no_mangle]
pub unsafe extern "C" fn s3_output_init(options: *const S3OutputOptions) -> i64 {
    let result = catch_unwind(AssertUnwindSafe(|| {
        logger::init();

        if options.is_null() {
            error!("S3 | Failed to initialize plugin: options are NULL");
            return -1;
        }
        let opts = &*options;

        let mut values = Vec::with_capacity(4);
        for (key, ptr) in [
            ("region", opts.region),
            ("bucket", opts.bucket),
            ("prefix", opts.prefix),
            ("gzip", opts.gzip),
        ] {
            match cstr_to_option(ptr) {
                Ok(Some(value)) => values.push((key, value)),
                Ok(None) => {}
                Err(()) => {
                    error!("S3 | Failed to initialize plugin: {key} is not valid UTF-8");
                    return -1;
                }
            }
        }
        let lookup = |key: &str| {
            values
                .iter()
                .find(|(k, _)| *k == key)
                .map(|(_, v)| v.clone())
        };

        let Ok(mut registry) = registry().lock() else {
            error!("S3 | Failed to initialize plugin: registry lock poisoned");
            return -1;
        };
        match registry.register(|id| OutputPlugin::init(id, lookup)) {
            Ok(handle) => i64::try_from(handle.as_raw()).unwrap_or(-1),
            Err(e) => {
                error!("S3 | Failed to initialize plugin: {e}");
                -1
            }
        }
    }));
    result.unwrap_or(-1)
}

/// Processes one batch and flushes it.
///
/// # Safety
/// `data` must point to `len` readable bytes (it may be NULL when `len` is 0)
/// and `tag` must be NULL or null-terminated.
#[no_mangle]
pub unsafe extern "C" fn s3_output_flush(
    handle: i64,
    data: *const u8,
    len: usize,
    tag: *const c_char,
) -> c_int {
    let result = catch_unwind(AssertUnwindSafe(|| {
        let Some(handle) = handle_from_raw(handle) else {
            return FLB_ERROR;
        };
        let batch: &[u8] = if len == 0 {
            &[]
        } else if data.is_null() {
            return FLB_ERROR;
        } else {
            std::slice::from_raw_parts(data, len)
        };
        let tag = if tag.is_null() {
            String::new()
        } else {
            CStr::from_ptr(tag).to_string_lossy().into_owned()
        };

        let plugin = match registry().lock() {
            Ok(registry) => registry.get(handle),
            Err(_) => return FLB_ERROR,
        };
        let plugin = match plugin {
            Ok(plugin) => plugin,
            Err(e) => {
                error!("S3 | {e}");
                return FLB_ERROR;
            }
        };
        let Ok(mut plugin) = plugin.lock() else {
            return FLB_ERROR;
        };
        plugin.process_batch(batch, &tag).code()
    }));
    result.unwrap_or(FLB_ERROR)
}

/// Destroys an instance. Anything still buffered is dropped.
#[no_mangle]
pub extern "C" fn s3_output_exit(handle: i64) -> c_int {
    let result = catch_unwind(|| {
        let Some(handle) = handle_from_raw(handle) else {
            return FLB_ERROR;
        };
        let removed = match registry().lock() {
            Ok(mut registry) => registry.remove(handle),
            Err(_) => return FLB_ERROR,
        };
        match removed {
            Ok(_) => FLB_OK,
            Err(e) => {
                error!("S3 | {e}");
                FLB_ERROR
            }
        }
    });
    result.unwrap_or(FLB_ERROR)
}
