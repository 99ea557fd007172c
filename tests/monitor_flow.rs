//! End-to-end flow through the IRC shell with an on-disk database.
//!
//! Covers: admin enabling a channel, counting, leaderboard and user stats,
//! disabling, and state surviving a restart.

use chanstats::config::Config;
use chanstats::db::Database;
use chanstats::shell::{IrcHost, Shell};
use chanstats::tracker::Tracker;
use std::sync::Arc;

fn config(db_path: &str, allow_admin_add: bool) -> Config {
    let mut config: Config = toml::from_str(&format!(
        r##"
[bot]
nick = "statsbot"
admins = ["alice"]

[channelstats]
channels = ["#rust"]
allow_admin_add = {allow_admin_add}
db_path = "{db_path}"
"##
    ))
    .unwrap();
    config.source_dir = None;
    config
}

async fn start(config: &Config) -> (Shell, Arc<Database>) {
    let db = Arc::new(Database::new(&config.db_path()).await.unwrap());
    let tracker = Tracker::from_config(config, db.clone());
    let host = Arc::new(IrcHost::from_config(config));
    (Shell::new(tracker, host), db)
}

async fn feed(shell: &Shell, lines: &[&str]) -> Vec<String> {
    let mut out = Vec::new();
    for line in lines {
        out.extend(shell.handle_line(line).await);
    }
    out
}

#[tokio::test]
async fn enable_count_query_disable_restart() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("monitor.db");
    let config = config(db_path.to_str().unwrap(), false);

    {
        let (shell, db) = start(&config).await;

        // Not yet enabled: nothing is counted.
        feed(&shell, &[":statsbot!s@h JOIN #rust", ":bob!b@h PRIVMSG #rust :early"]).await;

        let out = feed(&shell, &[":alice!a@h PRIVMSG statsbot :.monitor on #rust"]).await;
        assert_eq!(out, vec!["PRIVMSG alice :Monitoring ENABLED for #rust."]);

        feed(
            &shell,
            &[
                "@time=2024-01-01T00:00:00Z :bob!b@h PRIVMSG #rust :one",
                "@time=2024-01-01T00:01:00Z :carol!c@h PRIVMSG #rust :two",
                "@time=2024-01-01T00:02:00Z :Bob!b@h PRIVMSG #rust :three",
                "@time=2024-01-01T00:03:00Z :statsbot!s@h PRIVMSG #rust :not counted",
            ],
        )
        .await;

        let out = feed(&shell, &["@time=2024-01-01T00:04:00Z :carol!c@h PRIVMSG #rust :.userstats BOB"]).await;
        assert_eq!(
            out,
            vec!["PRIVMSG #rust :bob in #rust: messages=2, first_seen=2024-01-01 00:00:00 UTC, last_seen=2024-01-01 00:02:00 UTC"]
        );

        let out = feed(&shell, &[":alice!a@h PRIVMSG statsbot :.monitor off #rust"]).await;
        assert_eq!(out, vec!["PRIVMSG alice :Monitoring DISABLED for #rust."]);

        let out = feed(&shell, &[":bob!b@h PRIVMSG #rust :.channelstats"]).await;
        assert_eq!(out, vec!["PRIVMSG #rust :Monitoring is not enabled in this channel."]);

        db.pool().close().await;
    }

    // Counters and the disabled flag survive a restart.
    let (shell, db) = start(&config).await;
    let bob = db.stats().find("#rust", "bob").await.unwrap().unwrap();
    assert_eq!(bob.message_count, 2);
    // carol's `.userstats` counted too.
    let carol = db.stats().find("#rust", "carol").await.unwrap().unwrap();
    assert_eq!(carol.message_count, 2);

    let out = feed(&shell, &[":alice!a@h PRIVMSG statsbot :.monitor list"]).await;
    assert_eq!(out, vec!["PRIVMSG alice :No channels enabled for monitoring."]);

    // Presence is not persisted: the bot must rejoin before enabling.
    let out = feed(&shell, &[":alice!a@h PRIVMSG statsbot :.monitor on #rust"]).await;
    assert_eq!(out, vec!["PRIVMSG alice :I'm not currently in #rust."]);

    let out = feed(
        &shell,
        &[
            ":statsbot!s@h JOIN :#rust",
            ":alice!a@h PRIVMSG statsbot :.monitor on #rust",
            ":carol!c@h PRIVMSG #rust :.channelstats",
        ],
    )
    .await;
    assert_eq!(
        out,
        vec![
            "PRIVMSG alice :Monitoring ENABLED for #rust.",
            "PRIVMSG #rust :Top 10: 🥇 carol(3), 🥈 bob(2)",
            "PRIVMSG #rust :Bottom 10: carol(3), bob(2)",
        ]
    );
}

#[tokio::test]
async fn admin_added_channel_persists() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("monitor.db");
    let config = config(db_path.to_str().unwrap(), true);

    {
        let (shell, db) = start(&config).await;
        let out = feed(
            &shell,
            &[
                ":statsbot!s@h JOIN #extra",
                ":mallory!m@h PRIVMSG statsbot :.monitor on #extra",
                ":alice!a@h PRIVMSG statsbot :.monitor on #extra",
                ":dave!d@h PRIVMSG #extra :hello",
            ],
        )
        .await;
        assert_eq!(
            out,
            vec![
                "PRIVMSG mallory :Only bot admins can do that.",
                "PRIVMSG alice :Monitoring ENABLED for #extra.",
            ]
        );
        db.pool().close().await;
    }

    let (shell, db) = start(&config).await;
    let out = feed(&shell, &[":alice!a@h PRIVMSG statsbot :.monitor list"]).await;
    assert_eq!(out, vec!["PRIVMSG alice :Monitoring enabled in: #extra"]);
    assert_eq!(db.stats().find("#extra", "dave").await.unwrap().unwrap().message_count, 1);
}
