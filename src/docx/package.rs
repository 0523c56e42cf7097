use crate::error::ContainerError;

const LOCAL_HEADER_SIG: u32 = 0x0403_4b50;
const CENTRAL_HEADER_SIG: u32 = 0x0201_4b50;
const END_OF_CENTRAL_DIR_SIG: u32 = 0x0605_4b50;

const LOCAL_HEADER_LEN: usize = 30;
const CENTRAL_HEADER_LEN: usize = 46;
const END_OF_CENTRAL_DIR_LEN: usize = 22;
const MAX_COMMENT_LEN: usize = u16::MAX as usize;

const METHOD_STORED: u16 = 0;
const METHOD_DEFLATED: u16 = 8;

const FLAG_ENCRYPTED: u16 = 0x0001;
const FLAG_DATA_DESCRIPTOR: u16 = 0x0008;
const FLAG_UTF8: u16 = 0x0800;

const VERSION_NEEDED: u16 = 20;
const DEFLATE_LEVEL: u8 = 6;

// 1980-01-01 00:00, the earliest DOS timestamp.
const DEFAULT_DOS_TIME: u16 = 0;
const DEFAULT_DOS_DATE: u16 = 0x0021;

#[derive(Debug, Clone, PartialEq, Eq)]
struct PackageEntry {
    name: String,
    method: u16,
    flags: u16,
    dos_time: u16,
    dos_date: u16,
    crc32: u32,
    uncompressed_size: u32,
    compressed: Vec<u8>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Package {
    entries: Vec<PackageEntry>,
}

impl Package {
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, ContainerError> {
        let eocd = find_end_of_central_directory(bytes)?;
        let entry_count = read_u16(bytes, eocd + 10, "end of central directory")?;
        let directory_size = read_u32(bytes, eocd + 12, "end of central directory")?;
        let directory_offset = read_u32(bytes, eocd + 16, "end of central directory")?;

        if entry_count == u16::MAX || directory_offset == u32::MAX || directory_size == u32::MAX
        {
            return Err(ContainerError::Unsupported("zip64 archives"));
        }

        let mut entries = Vec::with_capacity(entry_count as usize);
        let mut cursor = directory_offset as usize;

        for _ in 0..entry_count {
            if read_u32(bytes, cursor, "central directory")? != CENTRAL_HEADER_SIG {
                return Err(ContainerError::Truncated {
                    what: "central directory header",
                });
            }

            let flags = read_u16(bytes, cursor + 8, "central directory")?;
            let method = read_u16(bytes, cursor + 10, "central directory")?;
            let dos_time = read_u16(bytes, cursor + 12, "central directory")?;
            let dos_date = read_u16(bytes, cursor + 14, "central directory")?;
            let crc32 = read_u32(bytes, cursor + 16, "central directory")?;
            let compressed_size = read_u32(bytes, cursor + 20, "central directory")?;
            let uncompressed_size = read_u32(bytes, cursor + 24, "central directory")?;
            let name_len = read_u16(bytes, cursor + 28, "central directory")? as usize;
            let extra_len = read_u16(bytes, cursor + 30, "central directory")? as usize;
            let comment_len = read_u16(bytes, cursor + 32, "central directory")? as usize;
            let local_offset = read_u32(bytes, cursor + 42, "central directory")? as usize;

            if compressed_size == u32::MAX || uncompressed_size == u32::MAX {
                return Err(ContainerError::Unsupported("zip64 archives"));
            }

            let name_start = cursor + CENTRAL_HEADER_LEN;
            let raw_name = slice(bytes, name_start, name_len, "entry name")?;
            let name = String::from_utf8_lossy(raw_name).into_owned();

            if flags & FLAG_ENCRYPTED != 0 {
                return Err(ContainerError::Encrypted { name });
            }

            let data_start = local_data_offset(bytes, local_offset)?;
            let compressed =
                slice(bytes, data_start, compressed_size as usize, "entry data")?.to_vec();

            entries.push(PackageEntry {
                name,
                method,
                flags: flags & !FLAG_DATA_DESCRIPTOR,
                dos_time,
                dos_date,
                crc32,
                uncompressed_size,
                compressed,
            });

            cursor = name_start + name_len + extra_len + comment_len;
        }

        Ok(Self { entries })
    }

    pub fn part_names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|entry| entry.name.as_str())
    }

    pub fn read_part(&self, name: &str) -> Result<Vec<u8>, ContainerError> {
        let entry = self
            .entries
            .iter()
            .find(|entry| entry.name == name)
            .ok_or_else(|| ContainerError::MissingPart {
                name: name.to_string(),
            })?;

        let data = match entry.method {
            METHOD_STORED => entry.compressed.clone(),
            METHOD_DEFLATED => miniz_oxide::inflate::decompress_to_vec_with_limit(
                &entry.compressed,
                (entry.uncompressed_size as usize).max(1),
            )
            .map_err(|err| ContainerError::Inflate {
                name: entry.name.clone(),
                status: format!("{:?}", err.status),
            })?,
            method => {
                return Err(ContainerError::UnsupportedMethod {
                    name: entry.name.clone(),
                    method,
                });
            }
        };

        let actual = crc32fast::hash(&data);
        if actual != entry.crc32 {
            return Err(ContainerError::ChecksumMismatch {
                name: entry.name.clone(),
                expected: entry.crc32,
                actual,
            });
        }

        Ok(data)
    }

    pub fn write_part(&mut self, name: &str, data: &[u8]) {
        let compressed = miniz_oxide::deflate::compress_to_vec(data, DEFLATE_LEVEL);
        let crc32 = crc32fast::hash(data);
        let uncompressed_size = data.len() as u32;

        if let Some(entry) = self.entries.iter_mut().find(|entry| entry.name == name) {
            entry.method = METHOD_DEFLATED;
            entry.crc32 = crc32;
            entry.uncompressed_size = uncompressed_size;
            entry.compressed = compressed;
            return;
        }

        let flags = if name.is_ascii() { 0 } else { FLAG_UTF8 };
        self.entries.push(PackageEntry {
            name: name.to_string(),
            method: METHOD_DEFLATED,
            flags,
            dos_time: DEFAULT_DOS_TIME,
            dos_date: DEFAULT_DOS_DATE,
            crc32,
            uncompressed_size,
            compressed,
        });
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::new();
        let mut offsets = Vec::with_capacity(self.entries.len());

        for entry in &self.entries {
            offsets.push(out.len() as u32);
            put_u32(&mut out, LOCAL_HEADER_SIG);
            put_u16(&mut out, VERSION_NEEDED);
            put_u16(&mut out, entry.flags);
            put_u16(&mut out, entry.method);
            put_u16(&mut out, entry.dos_time);
            put_u16(&mut out, entry.dos_date);
            put_u32(&mut out, entry.crc32);
            put_u32(&mut out, entry.compressed.len() as u32);
            put_u32(&mut out, entry.uncompressed_size);
            put_u16(&mut out, entry.name.len() as u16);
            put_u16(&mut out, 0);
            out.extend_from_slice(entry.name.as_bytes());
            out.extend_from_slice(&entry.compressed);
        }

        let directory_offset = out.len() as u32;
        for (entry, offset) in self.entries.iter().zip(offsets) {
            put_u32(&mut out, CENTRAL_HEADER_SIG);
            put_u16(&mut out, VERSION_NEEDED);
            put_u16(&mut out, VERSION_NEEDED);
            put_u16(&mut out, entry.flags);
            put_u16(&mut out, entry.method);
            put_u16(&mut out, entry.dos_time);
            put_u16(&mut out, entry.dos_date);
            put_u32(&mut out, entry.crc32);
            put_u32(&mut out, entry.compressed.len() as u32);
            put_u32(&mut out, entry.uncompressed_size);
            put_u16(&mut out, entry.name.len() as u16);
            put_u16(&mut out, 0);
            put_u16(&mut out, 0);
            put_u16(&mut out, 0);
            put_u16(&mut out, 0);
            put_u32(&mut out, 0);
            put_u32(&mut out, offset);
            out.extend_from_slice(entry.name.as_bytes());
        }
        let directory_size = out.len() as u32 - directory_offset;

        put_u32(&mut out, END_OF_CENTRAL_DIR_SIG);
        put_u16(&mut out, 0);
        put_u16(&mut out, 0);
        put_u16(&mut out, self.entries.len() as u16);
        put_u16(&mut out, self.entries.len() as u16);
        put_u32(&mut out, directory_size);
        put_u32(&mut out, directory_offset);
        put_u16(&mut out, 0);

        out
    }
}

fn find_end_of_central_directory(bytes: &[u8]) -> Result<usize, ContainerError> {
    if bytes.len() < END_OF_CENTRAL_DIR_LEN {
        return Err(ContainerError::MissingEndOfCentralDirectory);
    }

    let last = bytes.len() - END_OF_CENTRAL_DIR_LEN;
    let first = last.saturating_sub(MAX_COMMENT_LEN);

    (first..=last)
        .rev()
        .find(|&pos| bytes[pos..pos + 4] == END_OF_CENTRAL_DIR_SIG.to_le_bytes())
        .ok_or(ContainerError::MissingEndOfCentralDirectory)
}

fn local_data_offset(bytes: &[u8], local_offset: usize) -> Result<usize, ContainerError> {
    if read_u32(bytes, local_offset, "local header")? != LOCAL_HEADER_SIG {
        return Err(ContainerError::Truncated {
            what: "local file header",
        });
    }
    let name_len = read_u16(bytes, local_offset + 26, "local header")? as usize;
    let extra_len = read_u16(bytes, local_offset + 28, "local header")? as usize;
    Ok(local_offset + LOCAL_HEADER_LEN + name_len + extra_len)
}

fn slice<'a>(
    bytes: &'a [u8],
    start: usize,
    len: usize,
    what: &'static str,
) -> Result<&'a [u8], ContainerError> {
    start
        .checked_add(len)
        .and_then(|end| bytes.get(start..end))
        .ok_or(ContainerError::Truncated { what })
}

fn read_u16(bytes: &[u8], at: usize, what: &'static str) -> Result<u16, ContainerError> {
    let raw = slice(bytes, at, 2, what)?;
    Ok(u16::from_le_bytes([raw[0], raw[1]]))
}

fn read_u32(bytes: &[u8], at: usize, what: &'static str) -> Result<u32, ContainerError> {
    let raw = slice(bytes, at, 4, what)?;
    Ok(u32::from_le_bytes([raw[0], raw[1], raw[2], raw[3]]))
}

fn put_u16(out: &mut Vec<u8>, value: u16) {
    out.extend_from_slice(&value.to_le_bytes());
}

fn put_u32(out: &mut Vec<u8>, value: u32) {
    out.extend_from_slice(&value.to_le_bytes());
}
