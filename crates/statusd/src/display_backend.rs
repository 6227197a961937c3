use anyhow::Result;

/// Where a rendered status line ends up. The daemon never inspects the
/// outcome beyond failing hard if the sink cannot be opened at startup.
pub trait StatusSink {
    fn publish(&mut self, status: &str) -> Result<()>;
}

/// Open the sink this build was compiled for. Failure here is fatal to the
/// daemon.
#[cfg(feature = "x11")]
pub fn open_sink() -> Result<Box<dyn StatusSink>> {
    Ok(Box::new(x11::X11Sink::new()?))
}

#[cfg(not(feature = "x11"))]
pub fn open_sink() -> Result<Box<dyn StatusSink>> {
    Ok(Box::new(no_backend::StdoutSink))
}

#[cfg(feature = "x11")]
mod x11 {
    use anyhow::{Context, Result};
    use x11rb::{
        connection::Connection,
        protocol::xproto::{AtomEnum, PropMode, Window},
        rust_connection::RustConnection,
        wrapper::ConnectionExt as _,
    };

    /// Publishes the status line as the X root window's name, which bars
    /// like dwm display as their status text.
    pub struct X11Sink {
        conn: RustConnection,
        root_window: Window,
    }

    impl X11Sink {
        pub fn new() -> Result<Self> {
            let (conn, screen_num) = x11rb::connect(None).context("Failed to connect to the X server")?;
            let root_window = conn.setup().roots[screen_num].root;
            Ok(X11Sink { conn, root_window })
        }
    }

    impl super::StatusSink for X11Sink {
        fn publish(&mut self, status: &str) -> Result<()> {
            self.conn.change_property8(
                PropMode::REPLACE,
                self.root_window,
                AtomEnum::WM_NAME,
                AtomEnum::STRING,
                status.as_bytes(),
            )?;
            self.conn.flush()?;
            Ok(())
        }
    }
}

#[cfg(not(feature = "x11"))]
mod no_backend {
    use anyhow::Result;

    /// Fallback sink for builds without X11: one status line per render on
    /// stdout.
    pub struct StdoutSink;

    impl super::StatusSink for StdoutSink {
        fn publish(&mut self, status: &str) -> Result<()> {
            println!("{}", status);
            Ok(())
        }
    }
}
