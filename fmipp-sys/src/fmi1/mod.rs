//! FMI 1.0 model-exchange types and the runtime-resolved function table.
#![allow(non_upper_case_globals)]
#![allow(non_camel_case_types)]
#![allow(non_snake_case)]

use std::ffi::{c_char, c_int, c_uint, c_void};

mod binding;
pub mod logger;

pub use binding::Fmi1Binding;

pub type fmiComponent = *mut c_void;
pub type fmiValueReference = c_uint;
pub type fmiReal = f64;
pub type fmiInteger = c_int;
pub type fmiBoolean = c_char;
pub type fmiString = *const c_char;

pub const fmiTrue: fmiBoolean = 1;
pub const fmiFalse: fmiBoolean = 0;
pub const fmiUndefinedValueReference: fmiValueReference = fmiValueReference::MAX;

pub type fmiStatus = c_uint;
pub const fmiStatus_fmiOK: fmiStatus = 0;
pub const fmiStatus_fmiWarning: fmiStatus = 1;
pub const fmiStatus_fmiDiscard: fmiStatus = 2;
pub const fmiStatus_fmiError: fmiStatus = 3;
pub const fmiStatus_fmiFatal: fmiStatus = 4;

pub type fmiCallbackLogger = Option<
    unsafe extern "C" fn(
        c: fmiComponent,
        instanceName: fmiString,
        status: fmiStatus,
        category: fmiString,
        message: fmiString,
        ...
    ),
>;
pub type fmiCallbackAllocateMemory =
    Option<unsafe extern "C" fn(nobj: usize, size: usize) -> *mut c_void>;
pub type fmiCallbackFreeMemory = Option<unsafe extern "C" fn(obj: *mut c_void)>;

#[repr(C)]
#[derive(Debug, Copy, Clone)]
pub struct fmiCallbackFunctions {
    pub logger: fmiCallbackLogger,
    pub allocateMemory: fmiCallbackAllocateMemory,
    pub freeMemory: fmiCallbackFreeMemory,
}

#[repr(C)]
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct fmiEventInfo {
    pub iterationConverged: fmiBoolean,
    pub stateValueReferencesChanged: fmiBoolean,
    pub stateValuesChanged: fmiBoolean,
    pub terminateSimulation: fmiBoolean,
    pub upcomingTimeEvent: fmiBoolean,
    pub nextEventTime: fmiReal,
}

pub type fmiGetModelTypesPlatformTYPE = unsafe extern "C" fn() -> *const c_char;
pub type fmiGetVersionTYPE = unsafe extern "C" fn() -> *const c_char;
pub type fmiInstantiateModelTYPE = unsafe extern "C" fn(
    instanceName: fmiString,
    GUID: fmiString,
    functions: fmiCallbackFunctions,
    loggingOn: fmiBoolean,
) -> fmiComponent;
pub type fmiFreeModelInstanceTYPE = unsafe extern "C" fn(c: fmiComponent);
pub type fmiSetDebugLoggingTYPE =
    unsafe extern "C" fn(c: fmiComponent, loggingOn: fmiBoolean) -> fmiStatus;
pub type fmiSetTimeTYPE = unsafe extern "C" fn(c: fmiComponent, time: fmiReal) -> fmiStatus;
pub type fmiSetContinuousStatesTYPE =
    unsafe extern "C" fn(c: fmiComponent, x: *const fmiReal, nx: usize) -> fmiStatus;
pub type fmiCompletedIntegratorStepTYPE =
    unsafe extern "C" fn(c: fmiComponent, callEventUpdate: *mut fmiBoolean) -> fmiStatus;
pub type fmiSetRealTYPE = unsafe extern "C" fn(
    c: fmiComponent,
    vr: *const fmiValueReference,
    nvr: usize,
    value: *const fmiReal,
) -> fmiStatus;
pub type fmiSetIntegerTYPE = unsafe extern "C" fn(
    c: fmiComponent,
    vr: *const fmiValueReference,
    nvr: usize,
    value: *const fmiInteger,
) -> fmiStatus;
pub type fmiSetBooleanTYPE = unsafe extern "C" fn(
    c: fmiComponent,
    vr: *const fmiValueReference,
    nvr: usize,
    value: *const fmiBoolean,
) -> fmiStatus;
pub type fmiSetStringTYPE = unsafe extern "C" fn(
    c: fmiComponent,
    vr: *const fmiValueReference,
    nvr: usize,
    value: *const fmiString,
) -> fmiStatus;
pub type fmiInitializeTYPE = unsafe extern "C" fn(
    c: fmiComponent,
    toleranceControlled: fmiBoolean,
    relativeTolerance: fmiReal,
    eventInfo: *mut fmiEventInfo,
) -> fmiStatus;
pub type fmiGetDerivativesTYPE =
    unsafe extern "C" fn(c: fmiComponent, derivatives: *mut fmiReal, nx: usize) -> fmiStatus;
pub type fmiGetEventIndicatorsTYPE =
    unsafe extern "C" fn(c: fmiComponent, eventIndicators: *mut fmiReal, ni: usize) -> fmiStatus;
pub type fmiGetRealTYPE = unsafe extern "C" fn(
    c: fmiComponent,
    vr: *const fmiValueReference,
    nvr: usize,
    value: *mut fmiReal,
) -> fmiStatus;
pub type fmiGetIntegerTYPE = unsafe extern "C" fn(
    c: fmiComponent,
    vr: *const fmiValueReference,
    nvr: usize,
    value: *mut fmiInteger,
) -> fmiStatus;
pub type fmiGetBooleanTYPE = unsafe extern "C" fn(
    c: fmiComponent,
    vr: *const fmiValueReference,
    nvr: usize,
    value: *mut fmiBoolean,
) -> fmiStatus;
pub type fmiGetStringTYPE = unsafe extern "C" fn(
    c: fmiComponent,
    vr: *const fmiValueReference,
    nvr: usize,
    value: *mut fmiString,
) -> fmiStatus;
pub type fmiEventUpdateTYPE = unsafe extern "C" fn(
    c: fmiComponent,
    intermediateResults: fmiBoolean,
    eventInfo: *mut fmiEventInfo,
) -> fmiStatus;
pub type fmiGetContinuousStatesTYPE =
    unsafe extern "C" fn(c: fmiComponent, states: *mut fmiReal, nx: usize) -> fmiStatus;
pub type fmiGetNominalContinuousStatesTYPE =
    unsafe extern "C" fn(c: fmiComponent, x_nominal: *mut fmiReal, nx: usize) -> fmiStatus;
pub type fmiGetStateValueReferencesTYPE = unsafe extern "C" fn(
    c: fmiComponent,
    vrx: *mut fmiValueReference,
    nx: usize,
) -> fmiStatus;
pub type fmiTerminateTYPE = unsafe extern "C" fn(c: fmiComponent) -> fmiStatus;
