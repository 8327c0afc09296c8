use crate::commands::CommandKind;
use crate::commands::args::NoArgs;
use crate::error::Result;

pub fn run(_args: NoArgs) -> Result<()> {
    print!("{}", usage());
    Ok(())
}

/// 各コマンドの書式一覧を組み立てる。
pub fn usage() -> String {
    let mut text = String::from(
        "pathclip: copy and paste paths between shell sessions\n\n\
         Run as one of the commands below (via a link of that name),\n\
         or as `pathclip <command> [args]`.\n\n",
    );

    for kind in CommandKind::ALL {
        let (args, about) = kind.usage();
        let head = format!("{} {}", kind.name(), args);
        text.push_str(&format!("  {:<22}{}\n", head.trim_end(), about));
    }
    text
}
