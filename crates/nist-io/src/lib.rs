//! Tagged and fixed-binary readers/writers for ANSI/NIST-ITL transaction
//! files (spec §4.7, §4.8), built on the `bytes-io` stream-or-buffer
//! abstraction and the `nist-core` record model.

mod binary;
mod date;
mod error;
mod flip;
mod seg;
mod tagged;

pub use binary::{is_binary_record, read_binary_record, write_binary_record, IDC_FIELD, LEN_FIELD, PAYLOAD_FIELD};
pub use date::{format_creation_date, stamp_creation_date};
pub use error::NistIoError;
pub use flip::{flip_direction, flip_y_coord};
pub use seg::{lookup_type14_segments, FingerSegment, SEG_FIELD};
pub use tagged::{
    is_tagged_image_record, read_file, read_tagged_record, write_file, write_tagged_record, FS, GS,
    IMAGE_DATA_FIELD, RS,
};
