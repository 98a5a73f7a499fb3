// The numeric core: buffer descriptors, histogram accumulation, back-projection,
// moments and mean-shift. Everything here works on caller-owned buffers and never
// reports errors; `pipeline` is the validating layer on top.

pub mod back_projection;
pub mod buffer;
pub mod histogram;
pub mod moment;
pub mod tracker;
pub mod utils;
