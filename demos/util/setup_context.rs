// SPDX-License-Identifier: LGPL-3.0-or-later OR MPL-2.0
// This file is a part of `shader-program`.
//
// `shader-program` is free software: you can redistribute it and/or modify it under the
// terms of either:
//
// * GNU Lesser General Public License as published by the Free Software Foundation, either
//   version 3 of the License, or (at your option) any later version.
// * Mozilla Public License as published by the Mozilla Foundation, version 2.
//
// `shader-program` is distributed in the hope that it will be useful, but WITHOUT ANY
// WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS FOR A PARTICULAR
// PURPOSE. See the GNU Lesser General Public License or the Mozilla Public License for more
// details.
//
// You should have received a copy of the GNU Lesser General Public License and the Mozilla
// Public License along with `shader-program`. If not, see <https://www.gnu.org/licenses/>.

// Sets up a hidden window with a current OpenGL 3.3 core context through glutin.

use glutin::config::{Config, ConfigTemplateBuilder};
use glutin::context::{
    ContextApi, ContextAttributesBuilder, GlProfile, NotCurrentContext, PossiblyCurrentContext,
    Version,
};
use glutin::display::{Display, GetGlDisplay};
use glutin::prelude::*;
use glutin::surface::{Surface, WindowSurface};
use glutin_winit::{DisplayBuilder, GlWindow};

use raw_window_handle::HasRawWindowHandle;

use std::error::Error;

use winit::event::Event;
use winit::event_loop::{EventLoop, EventLoopWindowTarget};
use winit::window::{Window, WindowBuilder};

pub(crate) fn init() {
    tracing_subscriber::fmt::init();
}

struct GlutinSetup {
    display: Display,
    config: Config,
    context: Option<NotCurrentContext>,
    window: Option<Window>,
    _current: Option<Current>,
}

struct Current {
    _context: PossiblyCurrentContext,
    _surface: Surface<WindowSurface>,
    _window: Window,
}

fn make_window_builder() -> WindowBuilder {
    WindowBuilder::new()
        .with_title("shader-program demo")
        .with_visible(false)
}

impl GlutinSetup {
    fn new<T>(event_loop: &EventLoopWindowTarget<T>) -> Result<Self, Box<dyn Error>> {
        // Some platforms need the window before the display.
        let window = if cfg!(windows) {
            Some(make_window_builder())
        } else {
            None
        };

        let (window, config) = DisplayBuilder::new()
            .with_window_builder(window)
            .build(event_loop, ConfigTemplateBuilder::new(), |mut configs| {
                configs.next().expect("the display offers no GL configs")
            })?;

        tracing::info!("using GL config {config:?}");

        // The test shaders are GLSL 330, so ask for a 3.3 core context first.
        let window_handle = window.as_ref().map(|w| w.raw_window_handle());
        let attributes = [
            ContextAttributesBuilder::new()
                .with_context_api(ContextApi::OpenGl(Some(Version::new(3, 3))))
                .with_profile(GlProfile::Core)
                .build(window_handle),
            ContextAttributesBuilder::new().build(window_handle),
        ];

        let display = config.display();
        let context = attributes
            .iter()
            .find_map(|attributes| unsafe { display.create_context(&config, attributes).ok() })
            .ok_or("could not create a GL context")?;

        Ok(Self {
            display,
            config,
            context: Some(context),
            window,
            _current: None,
        })
    }

    fn make_current<T>(
        &mut self,
        target: &EventLoopWindowTarget<T>,
    ) -> Result<glow::Context, Box<dyn Error>> {
        let window = match self.window.take() {
            Some(window) => window,
            None => glutin_winit::finalize_window(target, make_window_builder(), &self.config)?,
        };

        let attrs = window.build_surface_attributes(<_>::default());
        let surface = unsafe { self.display.create_window_surface(&self.config, &attrs)? };

        let context = self
            .context
            .take()
            .ok_or("the GL context is already current")?
            .make_current(&surface)?;

        self._current = Some(Current {
            _context: context,
            _surface: surface,
            _window: window,
        });

        let display = &self.display;
        let gl = unsafe {
            glow::Context::from_loader_function_cstr(|s| display.get_proc_address(s) as *const _)
        };
        Ok(gl)
    }
}

/// Run `f` once with a current context, then exit with the code it returns.
pub(crate) fn with_context(
    f: impl FnOnce(glow::Context) -> i32 + 'static,
) -> Result<(), Box<dyn Error>> {
    let event_loop = EventLoop::new();
    let mut setup = GlutinSetup::new(&event_loop)?;
    let mut f = Some(f);

    event_loop.run(move |event, target, control_flow| {
        control_flow.set_wait();

        if let Event::Resumed = event {
            if let Some(f) = f.take() {
                let code = match setup.make_current(target) {
                    Ok(gl) => f(gl),
                    Err(err) => {
                        tracing::error!("failed to make the GL context current: {err}");
                        1
                    }
                };

                control_flow.set_exit_with_code(code);
            }
        }
    })
}
