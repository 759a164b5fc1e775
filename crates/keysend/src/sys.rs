//! `SendInput` backend.
//!
//! Keys are sent by hardware scan code, which games read through raw input,
//! rather than by virtual key. Text is sent as `KEYEVENTF_UNICODE` code units.

use std::mem::size_of;

use tracing::{info, trace};
use win_keycode::{Key, MouseButton};
use windows::Win32::UI::{
    Input::KeyboardAndMouse::{
        GetAsyncKeyState, INPUT, INPUT_0, INPUT_KEYBOARD, INPUT_MOUSE, KEYBD_EVENT_FLAGS,
        KEYBDINPUT, KEYEVENTF_EXTENDEDKEY, KEYEVENTF_KEYUP, KEYEVENTF_SCANCODE,
        KEYEVENTF_UNICODE, MAPVK_VK_TO_VSC, MOUSE_EVENT_FLAGS, MOUSEEVENTF_LEFTDOWN,
        MOUSEEVENTF_LEFTUP, MOUSEEVENTF_MIDDLEDOWN, MOUSEEVENTF_MIDDLEUP, MOUSEEVENTF_RIGHTDOWN,
        MOUSEEVENTF_RIGHTUP, MOUSEEVENTF_XDOWN, MOUSEEVENTF_XUP, MOUSEINPUT, MapVirtualKeyW,
        SendInput, VIRTUAL_KEY,
    },
    WindowsAndMessaging::GetForegroundWindow,
};

use crate::{Error, Input, InputEvent, InputSink, Result, WindowHandle};

/// `XBUTTON1` / `XBUTTON2` values for `MOUSEINPUT::mouseData`.
const XBUTTON1: u32 = 0x0001;
/// See [`XBUTTON1`].
const XBUTTON2: u32 = 0x0002;

/// Sink posting through `SendInput`.
pub struct SendInputSink;

/// Build a scan-code keyboard event for `key`.
fn key_input(key: Key, down: bool) -> INPUT {
    // SAFETY: MapVirtualKeyW has no preconditions.
    let scan = unsafe { MapVirtualKeyW(u32::from(key.code()), MAPVK_VK_TO_VSC) } as u16;
    let mut flags = KEYEVENTF_SCANCODE;
    if key.is_extended() {
        flags |= KEYEVENTF_EXTENDEDKEY;
    }
    if !down {
        flags |= KEYEVENTF_KEYUP;
    }
    keyboard(VIRTUAL_KEY(key.code()), scan, flags)
}

/// Build a mouse-button event for `button`.
fn button_input(button: MouseButton, down: bool) -> INPUT {
    let (flags, data) = match (button, down) {
        (MouseButton::Left, true) => (MOUSEEVENTF_LEFTDOWN, 0),
        (MouseButton::Left, false) => (MOUSEEVENTF_LEFTUP, 0),
        (MouseButton::Right, true) => (MOUSEEVENTF_RIGHTDOWN, 0),
        (MouseButton::Right, false) => (MOUSEEVENTF_RIGHTUP, 0),
        (MouseButton::Middle, true) => (MOUSEEVENTF_MIDDLEDOWN, 0),
        (MouseButton::Middle, false) => (MOUSEEVENTF_MIDDLEUP, 0),
        (MouseButton::X1, true) => (MOUSEEVENTF_XDOWN, XBUTTON1),
        (MouseButton::X1, false) => (MOUSEEVENTF_XUP, XBUTTON1),
        (MouseButton::X2, true) => (MOUSEEVENTF_XDOWN, XBUTTON2),
        (MouseButton::X2, false) => (MOUSEEVENTF_XUP, XBUTTON2),
    };
    mouse(flags, data)
}

/// Wrap a keyboard payload.
fn keyboard(vk: VIRTUAL_KEY, scan: u16, flags: KEYBD_EVENT_FLAGS) -> INPUT {
    INPUT {
        r#type: INPUT_KEYBOARD,
        Anonymous: INPUT_0 {
            ki: KEYBDINPUT {
                wVk: vk,
                wScan: scan,
                dwFlags: flags,
                time: 0,
                dwExtraInfo: 0,
            },
        },
    }
}

/// Wrap a mouse payload with no motion.
fn mouse(flags: MOUSE_EVENT_FLAGS, data: u32) -> INPUT {
    INPUT {
        r#type: INPUT_MOUSE,
        Anonymous: INPUT_0 {
            mi: MOUSEINPUT {
                dx: 0,
                dy: 0,
                mouseData: data,
                dwFlags: flags,
                time: 0,
                dwExtraInfo: 0,
            },
        },
    }
}

/// Expand one event into raw `INPUT` records.
fn expand(event: &InputEvent, out: &mut Vec<INPUT>) {
    match event {
        InputEvent::Down(Input::Key(k)) => out.push(key_input(*k, true)),
        InputEvent::Up(Input::Key(k)) => out.push(key_input(*k, false)),
        InputEvent::Down(Input::Button(b)) => out.push(button_input(*b, true)),
        InputEvent::Up(Input::Button(b)) => out.push(button_input(*b, false)),
        InputEvent::Text(text) => {
            for unit in text.encode_utf16() {
                out.push(keyboard(VIRTUAL_KEY(0), unit, KEYEVENTF_UNICODE));
                out.push(keyboard(
                    VIRTUAL_KEY(0),
                    unit,
                    KEYEVENTF_UNICODE | KEYEVENTF_KEYUP,
                ));
            }
        }
    }
}

impl InputSink for SendInputSink {
    fn is_held(&self, input: Input) -> bool {
        let code = match input {
            Input::Key(k) => k.code(),
            Input::Button(b) => b.code(),
        };
        // SAFETY: GetAsyncKeyState has no preconditions.
        let state = unsafe { GetAsyncKeyState(i32::from(code)) };
        // High bit set: currently down.
        state < 0
    }

    fn post(&self, events: &[InputEvent]) -> Result<()> {
        let mut inputs = Vec::with_capacity(events.len());
        for e in events {
            expand(e, &mut inputs);
        }
        if inputs.is_empty() {
            return Ok(());
        }
        trace!(count = inputs.len(), "send_input");
        // SAFETY: `inputs` is a valid slice of initialized INPUT records and
        // the size argument matches the element type.
        let sent = unsafe { SendInput(&inputs, size_of::<INPUT>() as i32) } as usize;
        if sent != inputs.len() {
            info!(sent, expected = inputs.len(), "send_input_partial");
            return Err(Error::Rejected {
                sent,
                expected: inputs.len(),
            });
        }
        Ok(())
    }

    fn foreground_window(&self) -> Option<WindowHandle> {
        // SAFETY: GetForegroundWindow has no preconditions.
        let hwnd = unsafe { GetForegroundWindow() };
        if hwnd.is_invalid() {
            None
        } else {
            Some(WindowHandle(hwnd.0 as isize))
        }
    }
}
