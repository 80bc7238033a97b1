use std::io;
use std::path::{Path, PathBuf};

use pilosa_ctl::check::CheckCommand;
use pilosa_ctl::inspect::InspectCommand;
use pilosa_ctl::Error;
use pilosa_roaring::PortableCodec;
use roaring::RoaringBitmap;

fn write_bitmap(dir: &Path, name: &str, rb: &RoaringBitmap) -> io::Result<PathBuf> {
    let mut data = Vec::new();
    rb.serialize_into(&mut data)?;

    let path = dir.join(name);
    std::fs::write(&path, data)?;
    Ok(path)
}

fn sample() -> RoaringBitmap {
    let mut rb = RoaringBitmap::new();
    rb.extend([1, 2, 3]);
    for i in 0..5000 {
        rb.insert((2 << 16) + i * 2);
    }
    rb
}

#[test]
fn test_inspect_portable_file() -> io::Result<()> {
    let dir = tempfile::tempdir()?;
    let path = write_bitmap(dir.as_ref(), "0", &sample())?;

    let (mut stdout, mut stderr) = (Vec::new(), Vec::new());
    InspectCommand::new(&path)
        .run(&PortableCodec, &mut stdout, &mut stderr)
        .unwrap();

    let stdout = String::from_utf8(stdout).unwrap();
    assert!(stdout.starts_with("== Bitmap Info ==\nContainers: 2\nOperations: 0\n"));
    assert!(stdout.contains("0   array         3        6 0x00000018\n"));
    assert!(stdout.contains("2   bitmap     5000     8192 0x0000001e\n"));

    Ok(())
}

#[test]
fn test_check_portable_files() -> io::Result<()> {
    let dir = tempfile::tempdir()?;
    let good = write_bitmap(dir.as_ref(), "0", &sample())?;

    // append garbage to a valid file
    let damaged = write_bitmap(dir.as_ref(), "1", &sample())?;
    let mut data = std::fs::read(&damaged)?;
    data.extend_from_slice(b"xyz");
    std::fs::write(&damaged, data)?;

    let cache = dir.as_ref().join("0.cache");
    std::fs::write(&cache, b"top-n")?;

    let (mut stdout, mut stderr) = (Vec::new(), Vec::new());
    CheckCommand::new(vec![good.clone(), cache.clone(), damaged.clone()])
        .run(&PortableCodec, &mut stdout, &mut stderr)
        .unwrap();

    assert_eq!(
        String::from_utf8(stdout).unwrap(),
        format!(
            "{good}: ok\n{damaged}: 3 trailing bytes after last container\n{damaged}: ok\n",
            good = good.display(),
            damaged = damaged.display()
        )
    );
    assert_eq!(
        String::from_utf8(stderr).unwrap(),
        format!("{}: ignoring cache file\n", cache.display())
    );

    Ok(())
}

#[test]
fn test_check_not_a_bitmap() -> io::Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.as_ref().join("0");
    std::fs::write(&path, b"1,10\n2,20\n")?;

    let (mut stdout, mut stderr) = (Vec::new(), Vec::new());
    let err = CheckCommand::new(vec![path])
        .run(&PortableCodec, &mut stdout, &mut stderr)
        .unwrap_err();

    assert!(matches!(err, Error::Decode { .. }));
    assert!(stdout.is_empty());

    Ok(())
}
