use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::buffer::Buffer;
use crate::commands::ProcessContext;
use crate::commands::summary::TransferSummary;
use crate::error::{Error, Result};
use crate::overwrite::OverwriteResolver;

pub mod args;
pub mod handlers;

use args::Args;
use handlers::CopyKind;

/// paste / paste-clear を実行する。
///
/// 途中で失敗しても、コピーできた分を除いたバッファを保存してからサマリーを表示する。
/// `clear_after` のときはスキップした分も含めてバッファを空にする。
pub fn run(args: Args, clear_after: bool, context: &ProcessContext) -> Result<()> {
    if args.dest.len() > 1 {
        return Err(Error::TooManyArguments {
            max: 1,
            given: args.dest.len(),
        });
    }
    let target = resolve_target(args.dest.first().map(PathBuf::as_path))?;

    let mut buffer = Buffer::load(&context.buffer_path)?;
    if buffer.is_empty() {
        return Err(Error::EmptySelection);
    }

    let mut resolver = OverwriteResolver::interactive(context.config.color_enabled());
    let mut summary = TransferSummary::for_buffer(&buffer);
    let result = paste_into(&mut buffer, &target, &mut resolver, &mut summary);

    let persisted = buffer.persist();
    println!("{}", summary.copied_line());
    let cleared = if clear_after { buffer.clear() } else { Ok(()) };

    result.and(persisted).and(cleared)
}

/// 貼り付け先ディレクトリを決める。省略時はカレントディレクトリ。
fn resolve_target(dest: Option<&Path>) -> Result<PathBuf> {
    let target = match dest {
        Some(path) => path.to_path_buf(),
        None => std::env::current_dir()
            .map_err(|e| Error::io("cannot access current directory", ".", e))?,
    };

    let canonical = target.canonicalize().map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => Error::NotFound(target.clone()),
        _ => Error::io("cannot access", &target, e),
    })?;
    match fs::metadata(&canonical) {
        Ok(meta) if meta.is_dir() => Ok(canonical),
        Ok(_) => Err(Error::InvalidDestination(target)),
        Err(e) => Err(Error::io("cannot stat", &canonical, e)),
    }
}

/// バッファの内容を `target` 配下へコピーし、成功したエントリをバッファから取り除く。
///
/// ディレクトリ、ファイルの順にそれぞれ辞書順で処理する。最初のエラーで残りは処理せず返す。
pub fn paste_into(
    buffer: &mut Buffer,
    target: &Path,
    resolver: &mut OverwriteResolver,
    summary: &mut TransferSummary,
) -> Result<()> {
    let dirs: Vec<PathBuf> = buffer.dirs().iter().cloned().collect();
    for source in dirs {
        if transfer(&source, target, CopyKind::Directory, resolver, summary)? {
            buffer.remove_dir(&source);
            summary.dirs_done += 1;
        }
    }

    let files: Vec<PathBuf> = buffer.files().iter().cloned().collect();
    for source in files {
        if transfer(&source, target, CopyKind::File, resolver, summary)? {
            buffer.remove_file(&source);
            summary.files_done += 1;
        }
    }

    Ok(())
}

/// 1 エントリをコピーする。上書きを断られた場合は `false` を返す。
fn transfer(
    source: &Path,
    target: &Path,
    kind: CopyKind,
    resolver: &mut OverwriteResolver,
    summary: &mut TransferSummary,
) -> Result<bool> {
    let file_name = source.file_name().ok_or_else(|| {
        Error::Argument(format!("cannot paste '{}': no file name", source.display()))
    })?;
    let mut destination = target.join(file_name);

    if path_entry_exists(&destination) {
        let (resolved, proceed) = resolver.resolve(source, destination)?;
        if !proceed {
            info!(source = %source.display(), "skipped existing destination");
            summary.skipped += 1;
            return Ok(false);
        }
        destination = resolved;
    }

    handlers::execute(kind, source, &destination)?;
    Ok(true)
}

/// ターゲット候補パスの存在をシンボリックリンクを含めて判定する。
fn path_entry_exists(path: &Path) -> bool {
    fs::symlink_metadata(path).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::overwrite::{Key, ScriptedKeys};
    use std::io;
    use tempfile::TempDir;

    struct Fixture {
        _temp_dir: TempDir,
        origin: PathBuf,
        target: PathBuf,
        buffer: Buffer,
    }

    fn fixture() -> Fixture {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path().canonicalize().unwrap();
        let origin = root.join("origin");
        let target = root.join("target");
        fs::create_dir(&origin).unwrap();
        fs::create_dir(&target).unwrap();
        let buffer = Buffer::empty(root.join("buffer.toml"));
        Fixture {
            _temp_dir: temp_dir,
            origin,
            target,
            buffer,
        }
    }

    fn resolver(keys: ScriptedKeys) -> OverwriteResolver {
        OverwriteResolver::new(Box::new(keys), Box::new(io::sink()), false)
    }

    #[test]
    fn test_paste_two_files_into_empty_directory() {
        let mut fx = fixture();
        for name in ["a.txt", "b.txt"] {
            let path = fx.origin.join(name);
            fs::write(&path, name).unwrap();
            fx.buffer.insert_file(path);
        }

        let mut summary = TransferSummary::for_buffer(&fx.buffer);
        paste_into(
            &mut fx.buffer,
            &fx.target,
            &mut resolver(ScriptedKeys::chars("")),
            &mut summary,
        )
        .unwrap();

        assert_eq!(summary.copied_line(), "2/2 files, 0/0 dirs copied, 0 skipped");
        assert!(fx.buffer.is_empty());
        assert_eq!(fs::read_to_string(fx.target.join("b.txt")).unwrap(), "b.txt");
        // コピー元は残る
        assert!(fx.origin.join("a.txt").exists());
    }

    #[test]
    fn test_declined_overwrite_keeps_entry_selected() {
        let mut fx = fixture();
        let source = fx.origin.join("a.txt");
        fs::write(&source, "new").unwrap();
        fs::write(fx.target.join("a.txt"), "old").unwrap();
        fx.buffer.insert_file(source.clone());

        let mut summary = TransferSummary::for_buffer(&fx.buffer);
        paste_into(
            &mut fx.buffer,
            &fx.target,
            &mut resolver(ScriptedKeys::chars("n")),
            &mut summary,
        )
        .unwrap();

        assert_eq!(summary.copied_line(), "0/1 files, 0/0 dirs copied, 1 skipped");
        assert!(fx.buffer.files().contains(&source));
        assert_eq!(fs::read_to_string(fx.target.join("a.txt")).unwrap(), "old");
    }

    #[test]
    fn test_accepted_overwrite_replaces_destination() {
        let mut fx = fixture();
        let source = fx.origin.join("a.txt");
        fs::write(&source, "new").unwrap();
        fs::write(fx.target.join("a.txt"), "old").unwrap();
        fx.buffer.insert_file(source);

        let mut summary = TransferSummary::for_buffer(&fx.buffer);
        paste_into(
            &mut fx.buffer,
            &fx.target,
            &mut resolver(ScriptedKeys::chars("y")),
            &mut summary,
        )
        .unwrap();

        assert_eq!(summary.files_done, 1);
        assert_eq!(fs::read_to_string(fx.target.join("a.txt")).unwrap(), "new");
    }

    #[test]
    fn test_sticky_answer_applies_to_later_conflicts() {
        let mut fx = fixture();
        for name in ["a.txt", "b.txt", "c.txt"] {
            let path = fx.origin.join(name);
            fs::write(&path, "new").unwrap();
            fs::write(fx.target.join(name), "old").unwrap();
            fx.buffer.insert_file(path);
        }

        let mut summary = TransferSummary::for_buffer(&fx.buffer);
        paste_into(
            &mut fx.buffer,
            &fx.target,
            &mut resolver(ScriptedKeys::chars("N")),
            &mut summary,
        )
        .unwrap();

        assert_eq!(summary.skipped, 3);
        assert_eq!(fx.buffer.files().len(), 3);
    }

    #[test]
    fn test_directories_are_pasted_before_files() {
        let mut fx = fixture();
        let dir = fx.origin.join("photos");
        fs::create_dir(&dir).unwrap();
        fs::write(dir.join("1.jpg"), "jpg").unwrap();
        let file = fx.origin.join("notes.txt");
        fs::write(&file, "notes").unwrap();
        fx.buffer.insert_dir(dir);
        fx.buffer.insert_file(file);

        let mut summary = TransferSummary::for_buffer(&fx.buffer);
        paste_into(
            &mut fx.buffer,
            &fx.target,
            &mut resolver(ScriptedKeys::chars("")),
            &mut summary,
        )
        .unwrap();

        assert_eq!(summary.copied_line(), "1/1 files, 1/1 dirs copied, 0 skipped");
        assert!(fx.target.join("photos").join("1.jpg").exists());
    }

    #[test]
    fn test_abort_keeps_unprocessed_entries() {
        let mut fx = fixture();
        let a = fx.origin.join("a.txt");
        let b = fx.origin.join("b.txt");
        fs::write(&a, "a").unwrap();
        fs::write(&b, "b").unwrap();
        fs::write(fx.target.join("b.txt"), "old").unwrap();
        fx.buffer.insert_file(a.clone());
        fx.buffer.insert_file(b.clone());

        let mut summary = TransferSummary::for_buffer(&fx.buffer);
        let err = paste_into(
            &mut fx.buffer,
            &fx.target,
            &mut resolver(ScriptedKeys::new([Key::Interrupt])),
            &mut summary,
        )
        .unwrap_err();

        assert!(matches!(err, Error::Aborted));
        assert_eq!(summary.files_done, 1);
        assert!(!fx.buffer.files().contains(&a));
        assert!(fx.buffer.files().contains(&b));
    }

    #[test]
    fn test_failing_entry_stops_loop_but_keeps_earlier_progress() {
        let mut fx = fixture();
        let a = fx.origin.join("a.txt");
        fs::write(&a, "a").unwrap();
        // 選択後に消えたファイル
        let gone = fx.origin.join("b.txt");
        let c = fx.origin.join("c.txt");
        fs::write(&c, "c").unwrap();
        fx.buffer.insert_file(a.clone());
        fx.buffer.insert_file(gone.clone());
        fx.buffer.insert_file(c.clone());

        let mut summary = TransferSummary::for_buffer(&fx.buffer);
        let err = paste_into(
            &mut fx.buffer,
            &fx.target,
            &mut resolver(ScriptedKeys::chars("")),
            &mut summary,
        )
        .unwrap_err();

        assert!(matches!(err, Error::Io { .. }));
        assert_eq!(summary.files_done, 1);
        assert!(!fx.buffer.files().contains(&a));
        assert!(fx.buffer.files().contains(&gone));
        assert!(fx.buffer.files().contains(&c));
    }

    #[cfg(unix)]
    #[test]
    fn test_dangling_link_at_destination_can_be_declined() {
        use std::os::unix::fs::symlink;

        let mut fx = fixture();
        let source = fx.origin.join("a.txt");
        fs::write(&source, "new").unwrap();
        symlink(fx.origin.join("nowhere"), fx.target.join("a.txt")).unwrap();
        fx.buffer.insert_file(source.clone());

        let mut summary = TransferSummary::for_buffer(&fx.buffer);
        paste_into(
            &mut fx.buffer,
            &fx.target,
            &mut resolver(ScriptedKeys::chars("n")),
            &mut summary,
        )
        .unwrap();

        assert_eq!(summary.copied_line(), "0/1 files, 0/0 dirs copied, 1 skipped");
        assert!(fx.buffer.files().contains(&source));
    }

    #[cfg(unix)]
    #[test]
    fn test_dangling_link_at_destination_can_be_overwritten() {
        use std::os::unix::fs::symlink;

        let mut fx = fixture();
        let source = fx.origin.join("a.txt");
        fs::write(&source, "new").unwrap();
        symlink(fx.origin.join("nowhere"), fx.target.join("a.txt")).unwrap();
        fx.buffer.insert_file(source);

        let mut summary = TransferSummary::for_buffer(&fx.buffer);
        paste_into(
            &mut fx.buffer,
            &fx.target,
            &mut resolver(ScriptedKeys::chars("y")),
            &mut summary,
        )
        .unwrap();

        assert_eq!(summary.files_done, 1);
        assert_eq!(fs::read_to_string(fx.target.join("a.txt")).unwrap(), "new");
        assert!(!fx.origin.join("nowhere").exists());
    }

    #[test]
    fn test_resolve_target_rejects_files() {
        let fx = fixture();
        let file = fx.origin.join("plain.txt");
        fs::write(&file, "").unwrap();

        assert!(matches!(
            resolve_target(Some(&file)),
            Err(Error::InvalidDestination(_))
        ));
        assert_eq!(resolve_target(Some(&fx.target)).unwrap(), fx.target);
    }
}
