use encoding_rs::WINDOWS_1252;
use nom::multi::{count, length_data};
use nom::number::complete::le_u32;
use nom::IResult;

/// The file-name list stored as the data of the directory sentinel entry:
/// a count followed by `(nameSize, nul-terminated bytes)` records.
#[derive(Debug, PartialEq)]
pub struct Directory {
    pub filenames: Vec<String>,
}

impl Directory {
    pub fn parse(input: &[u8]) -> IResult<&[u8], Self> {
        let (i, file_count) = le_u32(input)?;
        let (i, filenames) = count(directory_string, file_count as usize)(i)?;
        Ok((i, Self { filenames }))
    }
}

/// Names are declared with a trailing NUL included in `nameSize`, but the
/// slot can carry trailing garbage past that NUL as well; only the bytes up
/// to the first NUL are the name.
fn directory_string(input: &[u8]) -> IResult<&[u8], String> {
    let (i, data) = length_data(le_u32)(input)?;
    let name_bytes = match data.iter().position(|&b| b == 0) {
        Some(nul) => &data[..nul],
        None => data,
    };
    let (decoded, _, _) = WINDOWS_1252.decode(name_bytes);
    Ok((i, decoded.into_owned()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn it_parses() {
        let data = [
            0x02, 0x00, 0x00, 0x00, // file_count
            0x03, 0x00, 0x00, 0x00, b'h', b'i', 0x00, // "hi\0"
            0x04, 0x00, 0x00, 0x00, b'a', b'b', b'c', 0x00, // "abc\0"
        ];

        let (remaining, directory) = Directory::parse(&data).unwrap();

        assert_eq!(
            directory,
            Directory {
                filenames: vec!["hi".to_string(), "abc".to_string()],
            }
        );
        assert!(remaining.is_empty());
    }

    #[test]
    fn it_strips_the_trailing_nul() {
        let data = [
            0x01, 0x00, 0x00, 0x00, 0x05, 0x00, 0x00, 0x00, b'h', b'i', b'.', b'b', 0x00,
        ];

        let (_, directory) = Directory::parse(&data).unwrap();
        assert_eq!(directory.filenames, vec!["hi.b".to_string()]);
    }

    #[test]
    fn it_truncates_at_the_first_nul_ignoring_trailing_garbage() {
        let data = [
            0x01, 0x00, 0x00, 0x00, 0x05, 0x00, 0x00, 0x00, b'h', b'i', 0x00, b'a', b'a',
        ];

        let (_, directory) = Directory::parse(&data).unwrap();
        assert_eq!(directory.filenames, vec!["hi".to_string()]);
    }
}
