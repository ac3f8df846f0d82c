//! Decoding of raw member headers into [`Entry`] values.

use std::fmt;

use crate::native::RAR_COMMENTS_SUCCESS;
use crate::native::RawHeader;

/// Civil date and time decoded from a packed DOS timestamp.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DosDateTime {
    /// Year (1980–2107).
    pub year: u16,
    /// Month (1–12 for valid timestamps).
    pub month: u8,
    /// Day of month (1–31 for valid timestamps).
    pub day: u8,
    /// Hour (0–23 for valid timestamps).
    pub hour: u8,
    /// Minute (0–59 for valid timestamps).
    pub minute: u8,
    /// Second, always even.
    pub second: u8,
}

impl DosDateTime {
    /// Returns `(year, month, day, hour, minute, second)`.
    #[must_use]
    pub const fn as_tuple(self) -> (u16, u8, u8, u8, u8, u8) {
        (
            self.year,
            self.month,
            self.day,
            self.hour,
            self.minute,
            self.second,
        )
    }
}

impl fmt::Display for DosDateTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}-{:02}-{:02} {:02}:{:02}:{:02}",
            self.year, self.month, self.day, self.hour, self.minute, self.second
        )
    }
}

/// Decodes a packed DOS timestamp.
///
/// Bit layout, high to low: 7 bits year since 1980, 4 bits month, 5 bits
/// day, 5 bits hour, 6 bits minute, 5 bits second / 2. Out-of-range fields
/// are passed through unchanged.
///
/// # Examples
///
/// ```
/// use rarfile_core::decode_dos_timestamp;
///
/// let t = decode_dos_timestamp(0x5A2E_6B4F);
/// assert_eq!(t.as_tuple(), (2025, 1, 14, 13, 26, 30));
/// ```
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub const fn decode_dos_timestamp(raw: u32) -> DosDateTime {
    DosDateTime {
        year: ((raw >> 25) & 0x7f) as u16 + 1980,
        month: ((raw >> 21) & 0x0f) as u8,
        day: ((raw >> 16) & 0x1f) as u8,
        hour: ((raw >> 11) & 0x1f) as u8,
        minute: ((raw >> 5) & 0x3f) as u8,
        second: ((raw & 0x1f) * 2) as u8,
    }
}

/// Operating system the member was archived on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HostOs {
    /// MS-DOS.
    Dos,
    /// OS/2.
    Os2,
    /// Windows.
    Windows,
    /// Unix.
    Unix,
    /// A value outside the known set, kept verbatim.
    Other(u32),
}

impl HostOs {
    /// Maps the native host OS value.
    #[must_use]
    pub const fn from_raw(raw: u32) -> Self {
        match raw {
            0 => Self::Dos,
            1 => Self::Os2,
            2 => Self::Windows,
            3 => Self::Unix,
            other => Self::Other(other),
        }
    }
}

impl fmt::Display for HostOs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Dos => f.write_str("MS-DOS"),
            Self::Os2 => f.write_str("OS/2"),
            Self::Windows => f.write_str("Windows"),
            Self::Unix => f.write_str("Unix"),
            Self::Other(raw) => write!(f, "unknown ({raw})"),
        }
    }
}

/// Header flag bits of a member.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct EntryFlags(u32);

impl EntryFlags {
    /// Member continues from the previous volume.
    pub const SPLIT_BEFORE: u32 = 0x01;
    /// Member continues in the next volume.
    pub const SPLIT_AFTER: u32 = 0x02;
    /// Member data is encrypted.
    pub const ENCRYPTED: u32 = 0x04;
    /// Member uses solid compression.
    pub const SOLID: u32 = 0x10;
    /// Member is a directory.
    pub const DIRECTORY: u32 = 0x20;

    /// Wraps raw flag bits.
    #[must_use]
    pub const fn from_bits(bits: u32) -> Self {
        Self(bits)
    }

    /// Raw flag bits.
    #[must_use]
    pub const fn bits(self) -> u32 {
        self.0
    }

    /// Returns `true` if every bit in `flag` is set.
    #[must_use]
    pub const fn contains(self, flag: u32) -> bool {
        self.0 & flag == flag
    }
}

/// Metadata of one archive member.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    /// Member name.
    pub filename: String,
    /// Packed DOS timestamp as stored in the archive.
    pub raw_timestamp: u32,
    /// Decoded modification time.
    pub modified_at: DosDateTime,
    /// Packed size in bytes.
    pub compressed_size: u64,
    /// Unpacked size in bytes.
    pub uncompressed_size: u64,
    /// Operating system the member was archived on.
    pub origin_os: HostOs,
    /// Minimum decoder version needed to extract.
    pub min_extractor_version: u32,
    /// CRC32 reported by the container.
    pub crc32: u32,
    /// File attributes, passed through untouched.
    pub attribute_flags: u32,
    /// Compression method.
    pub method: u32,
    /// Header flags.
    pub header_flags: EntryFlags,
    /// Member comment, present only when it was read completely.
    pub comment: Option<String>,
}

impl Entry {
    /// Decodes a raw header. Never fails: malformed headers are reported by
    /// the native layer before they get here.
    #[must_use]
    pub fn from_raw(raw: &RawHeader) -> Self {
        let comment =
            (raw.comment_state == RAR_COMMENTS_SUCCESS).then(|| decode_comment(&raw.comment));

        Self {
            filename: raw.filename.clone(),
            raw_timestamp: raw.file_time,
            modified_at: decode_dos_timestamp(raw.file_time),
            compressed_size: join_size(raw.pack_size, raw.pack_size_high),
            uncompressed_size: join_size(raw.unp_size, raw.unp_size_high),
            origin_os: HostOs::from_raw(raw.host_os),
            min_extractor_version: raw.unp_ver,
            crc32: raw.file_crc,
            attribute_flags: raw.file_attr,
            method: raw.method,
            header_flags: EntryFlags::from_bits(raw.flags),
            comment,
        }
    }

    /// Returns `true` if the member is a directory.
    #[must_use]
    pub const fn is_directory(&self) -> bool {
        self.header_flags.contains(EntryFlags::DIRECTORY)
    }

    /// Returns `true` if the member data is encrypted.
    #[must_use]
    pub const fn is_encrypted(&self) -> bool {
        self.header_flags.contains(EntryFlags::ENCRYPTED)
    }

    /// Returns `true` if the member spans more than one volume.
    #[must_use]
    pub const fn is_split(&self) -> bool {
        self.header_flags.contains(EntryFlags::SPLIT_BEFORE)
            || self.header_flags.contains(EntryFlags::SPLIT_AFTER)
    }
}

impl From<RawHeader> for Entry {
    fn from(raw: RawHeader) -> Self {
        Self::from_raw(&raw)
    }
}

/// Joins the 32-bit halves of a size field.
#[must_use]
pub const fn join_size(low: u32, high: u32) -> u64 {
    (low as u64) | ((high as u64) << 32)
}

/// Decodes comment text up to the first NUL byte.
pub(crate) fn decode_comment(bytes: &[u8]) -> String {
    let end = bytes.iter().position(|&b| b == 0).unwrap_or(bytes.len());
    String::from_utf8_lossy(&bytes[..end]).into_owned()
}
