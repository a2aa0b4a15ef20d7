//! Menu entries

pub const MENU: &str = "\n=== S3 Operations Menu ===\n\
1. List Buckets\n\
2. Create Bucket\n\
3. Delete Bucket\n\
4. List Objects in Bucket\n\
5. Get Object\n\
6. Upload Object\n\
7. Delete Object\n\
8. Exit";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuChoice {
    ListBuckets,
    CreateBucket,
    DeleteBucket,
    ListObjects,
    GetObject,
    UploadObject,
    DeleteObject,
    Exit,
}

impl MenuChoice {
    /// Parse a menu selection. Anything other than `1`..`8` is `None`.
    pub fn parse(input: &str) -> Option<Self> {
        match input.trim() {
            "1" => Some(MenuChoice::ListBuckets),
            "2" => Some(MenuChoice::CreateBucket),
            "3" => Some(MenuChoice::DeleteBucket),
            "4" => Some(MenuChoice::ListObjects),
            "5" => Some(MenuChoice::GetObject),
            "6" => Some(MenuChoice::UploadObject),
            "7" => Some(MenuChoice::DeleteObject),
            "8" => Some(MenuChoice::Exit),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_every_entry() {
        let expected = [
            MenuChoice::ListBuckets,
            MenuChoice::CreateBucket,
            MenuChoice::DeleteBucket,
            MenuChoice::ListObjects,
            MenuChoice::GetObject,
            MenuChoice::UploadObject,
            MenuChoice::DeleteObject,
            MenuChoice::Exit,
        ];
        for (i, choice) in expected.iter().enumerate() {
            assert_eq!(MenuChoice::parse(&(i + 1).to_string()), Some(*choice));
        }
    }

    #[test]
    fn tolerates_surrounding_whitespace() {
        assert_eq!(MenuChoice::parse(" 8 \n"), Some(MenuChoice::Exit));
    }

    #[test]
    fn rejects_unknown_input() {
        for input in ["", "0", "9", "exit", "1 2"] {
            assert_eq!(MenuChoice::parse(input), None, "{:?}", input);
        }
    }
}
