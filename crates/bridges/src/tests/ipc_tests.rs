use super::*;

use std::time::{SystemTime, UNIX_EPOCH};

use controller::{EventQueue, QueueItem};
use shared::event::Event;

fn temp_dir(label: &str) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("clock")
        .as_nanos();
    let dir = std::env::temp_dir().join(format!("statusbar-{label}-{nanos}"));
    fs::create_dir_all(&dir).expect("temp dir");
    dir
}

#[test]
fn socket_names_carry_the_pid() {
    let path = socket_path(Path::new("/tmp"), 4242);
    assert_eq!(path, PathBuf::from("/tmp/statusbar_ipc.4242.sock"));
}

#[test]
fn finds_sockets_by_name() {
    let dir = temp_dir("find");
    for name in [
        "statusbar_ipc.20.sock",
        "statusbar_ipc.3.sock",
        "statusbar_ipc.abc.sock",
        "other.sock",
    ] {
        fs::write(dir.join(name), b"").expect("touch");
    }

    let found = find_sockets(&dir).expect("scan");
    let pids: Vec<u32> = found.iter().map(|(pid, _)| *pid).collect();
    assert_eq!(pids, vec![3, 20]);
    assert_eq!(found[0].1, dir.join("statusbar_ipc.3.sock"));

    let _ = fs::remove_dir_all(dir);
}

#[test]
fn accepted_messages_are_queued() {
    let queue = EventQueue::new();
    let events = queue.handle();

    assert_eq!(accept_message("cmd:quit", &events), IpcReply::Ok);
    assert_eq!(
        accept_message("action:#clock.toggle", &events),
        IpcReply::Ok
    );
    assert!(matches!(accept_message("bogus", &events), IpcReply::Error(_)));

    assert_eq!(
        queue.try_pop(),
        Some(QueueItem::Signal(Event::IpcCommand("quit".into())))
    );
    assert_eq!(
        queue.try_pop(),
        Some(QueueItem::Signal(Event::IpcAction("#clock.toggle".into())))
    );
    assert!(queue.is_empty());

    queue.close();
    assert!(matches!(
        accept_message("hook:module/menu 1", &events),
        IpcReply::Error(_)
    ));
}

#[tokio::test]
async fn serves_messages_over_the_socket() {
    let dir = temp_dir("serve");
    let path = socket_path(&dir, 7);
    let queue = EventQueue::new();

    let mut server = IpcServer::spawn(path.clone(), queue.handle()).expect("server");
    assert_eq!(server.path(), path.as_path());

    let reply = send(&path, &IpcMessage::Hook("module/menu 2".into()))
        .await
        .expect("send");
    assert_eq!(reply, IpcReply::Ok);
    assert_eq!(
        queue.try_pop(),
        Some(QueueItem::Signal(Event::IpcHook("module/menu 2".into())))
    );

    server.stop();
    assert!(!path.exists());
    assert!(send(&path, &IpcMessage::Command("quit".into())).await.is_err());

    let _ = fs::remove_dir_all(dir);
}

#[tokio::test]
async fn malformed_lines_get_an_error_reply() {
    let dir = temp_dir("malformed");
    let path = socket_path(&dir, 8);
    let queue = EventQueue::new();
    let server = IpcServer::spawn(path.clone(), queue.handle()).expect("server");

    let stream = UnixStream::connect(&path).await.expect("connect");
    let (reader, mut writer) = stream.into_split();
    writer.write_all(b"nonsense\n\ncmd:\n").await.expect("write");

    let mut lines = BufReader::new(reader).lines();
    for _ in 0..2 {
        let line = lines.next_line().await.expect("read").expect("reply");
        assert!(line.starts_with("error:"), "{line}");
    }
    assert!(queue.is_empty());

    drop(server);
    let _ = fs::remove_dir_all(dir);
}
