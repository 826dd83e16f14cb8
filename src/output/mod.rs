use std::fs::{File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::classify::Category;
use crate::error::{Error, Result};

///
/// Receiver of classified entity ids.
///
pub trait IdSink {
    fn write_id(&mut self, type_char: char, id: i64) -> io::Result<()>;

    fn flush(&mut self) -> io::Result<()>;
}

///
/// Writes one `<type-char><id>` token per line.
///
pub struct IdListWriter<W: Write> {
    writer: W,
    count: u64,
}

impl<W: Write> IdListWriter<W> {
    pub fn new(writer: W) -> Self {
        IdListWriter { writer, count: 0 }
    }

    pub fn count(&self) -> u64 {
        self.count
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> IdSink for IdListWriter<W> {
    fn write_id(&mut self, type_char: char, id: i64) -> io::Result<()> {
        self.count += 1;
        writeln!(&mut self.writer, "{}{}", type_char, id)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.writer.flush()
    }
}

/// A missing output drops everything written to it.
impl<S: IdSink> IdSink for Option<S> {
    fn write_id(&mut self, type_char: char, id: i64) -> io::Result<()> {
        match self {
            Some(sink) => sink.write_id(type_char, id),
            None => Ok(()),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            Some(sink) => sink.flush(),
            None => Ok(()),
        }
    }
}

///
/// Create an output file. Existing files are only replaced if `overwrite`
/// is set.
///
pub fn create_file(path: &Path, overwrite: bool) -> Result<BufWriter<File>> {
    let mut options = OpenOptions::new();
    options.write(true);
    if overwrite {
        options.create(true).truncate(true);
    } else {
        options.create_new(true);
    }

    let file = options.open(path).map_err(|source| Error::Open {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(BufWriter::new(file))
}

pub fn create_id_list(path: &Path, overwrite: bool) -> Result<IdListWriter<BufWriter<File>>> {
    create_file(path, overwrite).map(IdListWriter::new)
}

///
/// Routes ids to one sink per tag category.
///
pub struct CategoryWriter<S: IdSink> {
    sinks: Vec<S>,
}

impl<S: IdSink> CategoryWriter<S> {
    pub fn new<F>(mut create: F) -> Result<Self>
    where
        F: FnMut(Category) -> Result<S>,
    {
        let sinks = Category::ALL
            .iter()
            .map(|category| create(*category))
            .collect::<Result<Vec<S>>>()?;
        Ok(CategoryWriter { sinks })
    }

    pub fn write_id(&mut self, category: Category, type_char: char, id: i64) -> io::Result<()> {
        self.sink(category).write_id(type_char, id)
    }

    pub fn sink(&mut self, category: Category) -> &mut S {
        &mut self.sinks[category.index()]
    }

    pub fn flush(&mut self) -> io::Result<()> {
        for sink in &mut self.sinks {
            sink.flush()?;
        }
        Ok(())
    }
}

/// Write `value` as pretty printed JSON and flush the writer.
pub fn write_json<W: Write, T: Serialize + ?Sized>(mut writer: W, value: &T) -> Result<()> {
    serde_json::to_writer_pretty(&mut writer, value).map_err(Error::Json)?;
    writer.flush()?;
    Ok(())
}

/// Output path of the partition holding `category`.
pub fn partition_path(prefix: &str, category: Category) -> PathBuf {
    PathBuf::from(format!("{}-{}.ids", prefix, category.label()))
}

impl CategoryWriter<IdListWriter<BufWriter<File>>> {
    pub fn create(prefix: &str, overwrite: bool) -> Result<Self> {
        CategoryWriter::new(|category| create_id_list(&partition_path(prefix, category), overwrite))
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_id_list() {
        let mut writer = IdListWriter::new(Vec::new());
        writer.write_id('w', 12).unwrap();
        writer.write_id('r', -3).unwrap();
        assert_eq!(writer.count(), 2);
        assert_eq!(writer.into_inner(), b"w12\nr-3\n");
    }

    #[test]
    fn test_missing_sink() {
        let mut sink: Option<IdListWriter<Vec<u8>>> = None;
        sink.write_id('w', 1).unwrap();
        sink.flush().unwrap();
    }

    #[test]
    fn test_category_writer() {
        let mut writer = CategoryWriter::new(|_| Ok(IdListWriter::new(Vec::new()))).unwrap();
        writer.write_id(Category::Polygon, 'w', 1).unwrap();
        writer.write_id(Category::Both, 'w', 2).unwrap();
        writer.write_id(Category::Polygon, 'w', 3).unwrap();

        assert_eq!(writer.sink(Category::Polygon).count(), 2);
        assert_eq!(writer.sink(Category::Both).count(), 1);
        assert_eq!(writer.sink(Category::Unknown).count(), 0);
    }

    #[test]
    fn test_write_json() {
        let mut buffer = Vec::new();
        write_json(&mut buffer, &vec![1, 2]).unwrap();
        assert_eq!(buffer, b"[\n  1,\n  2\n]");
    }

    struct BrokenPipe;

    impl Write for BrokenPipe {
        fn write(&mut self, _: &[u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_json_write_failure() {
        match write_json(BrokenPipe, &vec![1, 2]) {
            Err(err @ Error::Json(_)) => {
                assert!(err.to_string().starts_with("could not write JSON output"))
            }
            other => panic!("expected a JSON output error, got {:?}", other),
        }
    }

    #[test]
    fn test_partition_path() {
        assert_eq!(
            partition_path("out/closed-way-tags", Category::NoTags),
            PathBuf::from("out/closed-way-tags-notags.ids")
        );
    }

    #[test]
    fn test_no_silent_overwrite() {
        let path = std::env::temp_dir().join(format!("oat-output-test-{}.ids", std::process::id()));
        let _ = std::fs::remove_file(&path);

        create_file(&path, false).unwrap();
        match create_file(&path, false) {
            Err(Error::Open { .. }) => (),
            _ => panic!("expected existing file to be refused"),
        }
        assert!(create_file(&path, true).is_ok());

        std::fs::remove_file(&path).unwrap();
    }
}
