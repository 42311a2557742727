//! Interactive capture session.
//!
//! Drives the screen flow over stdin/stdout: camera (or image file) to
//! region selection to recognition to the entry form to the saved list.
//! Every error path prints its message and returns to an interactive
//! screen; nothing here is fatal to the session.

use std::io::{BufRead, Write};
use std::path::Path;
use std::time::Duration;

use anyhow::Result;
use image::RgbaImage;

use crate::capture::{self, CaptureError};
use crate::config::AppConfig;
use crate::flow::{FlowEvent, Screen, ScreenFlow, ScreenKind};
use crate::form::EntryForm;
use crate::ocr::OcrSession;
use crate::selection::{DragSelection, Viewport};
use crate::store::{InventoryRecord, RecordStore};

/// Opens the configured store and recognition engine, then runs the
/// session until the user quits.
pub fn run() -> Result<()> {
    let config = crate::config::get_config();
    let mut store = crate::store::open_backend(config)?;

    let ocr = match OcrSession::initialize(
        config.ocr_contrast,
        Duration::from_millis(config.recognition_timeout_ms),
    ) {
        Ok(session) => Some(session),
        Err(e) => {
            crate::log(&format!(
                "Recognition engine unavailable: {:#}. Manual entry only.",
                e
            ));
            None
        }
    };

    let stdin = std::io::stdin();
    let stdout = std::io::stdout();
    run_session(
        stdin.lock(),
        stdout.lock(),
        store.as_mut(),
        ocr.as_ref(),
        config,
    )?;

    if let Some(session) = ocr {
        session.teardown();
    }
    Ok(())
}

/// Case-insensitive substring filter over product numbers. An empty query
/// matches everything.
pub fn filter_by_product_number<'a>(
    records: &'a [InventoryRecord],
    query: &str,
) -> Vec<&'a InventoryRecord> {
    let query = query.trim().to_lowercase();
    records
        .iter()
        .filter(|r| query.is_empty() || r.product_number.to_lowercase().contains(&query))
        .collect()
}

fn read_line<R: BufRead>(input: &mut R) -> Result<Option<String>> {
    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim().to_string()))
}

fn acquire_from_device(config: &AppConfig) -> Result<RgbaImage, CaptureError> {
    let mut handle = capture::open_device(&config.capture_device)?;
    let frame = handle.still(Duration::from_millis(config.frame_timeout_ms))?;
    // Release before leaving the capture screen; the drop on the error
    // paths above does the same.
    handle.release();
    Ok(frame)
}

/// Runs the screen flow against the given I/O until quit or end of input.
pub fn run_session<R: BufRead, W: Write>(
    mut input: R,
    mut output: W,
    store: &mut dyn RecordStore,
    ocr: Option<&OcrSession>,
    config: &AppConfig,
) -> Result<()> {
    let mut flow = ScreenFlow::new();
    let mut form: Option<EntryForm> = None;

    loop {
        match flow.kind() {
            ScreenKind::Start => {
                writeln!(output)?;
                writeln!(output, "== 품번 인식 재고 정리 ==")?;
                writeln!(
                    output,
                    "[1] start capture  [2] saved list  [3] packaging units  [q] quit"
                )?;
                let Some(cmd) = read_line(&mut input)? else {
                    break;
                };
                match cmd.as_str() {
                    "1" => apply(&mut output, &mut flow, FlowEvent::BeginCapture)?,
                    "2" => apply(&mut output, &mut flow, FlowEvent::ViewList)?,
                    "3" => {
                        if flow.open_units_modal().is_ok() {
                            units_modal(&mut input, &mut output, store)?;
                            flow.close_units_modal();
                        }
                    }
                    "q" => break,
                    other => writeln!(output, "Unknown choice: {}", other)?,
                }
            }

            ScreenKind::Camera => {
                writeln!(output, "-- Camera --")?;
                writeln!(
                    output,
                    "Enter an image file path, 'device' for the camera, or 'cancel':"
                )?;
                let Some(cmd) = read_line(&mut input)? else {
                    break;
                };
                match cmd.as_str() {
                    "cancel" => apply(&mut output, &mut flow, FlowEvent::Cancel)?,
                    "device" => match acquire_from_device(config) {
                        Ok(image) => {
                            apply(&mut output, &mut flow, FlowEvent::ImageAcquired(image))?
                        }
                        Err(e) => {
                            writeln!(output, "{}", e)?;
                            apply(&mut output, &mut flow, FlowEvent::Cancel)?;
                        }
                    },
                    "" => {}
                    path => match capture::acquire_from_file(Path::new(path)) {
                        Ok(image) => {
                            apply(&mut output, &mut flow, FlowEvent::ImageAcquired(image))?
                        }
                        Err(e) => writeln!(output, "{:#}", e)?,
                    },
                }
            }

            ScreenKind::Preview => {
                let (width, height) = match flow.screen() {
                    Screen::Preview { image } => image.dimensions(),
                    _ => unreachable!("kind() said preview"),
                };
                writeln!(output, "-- Preview ({}x{}) --", width, height)?;
                writeln!(
                    output,
                    "Select the product number region: 'x0 y0 x1 y1' drag, \
                     'manual <number>', 'retake' or 'cancel':"
                )?;
                let Some(cmd) = read_line(&mut input)? else {
                    break;
                };
                if cmd == "retake" {
                    apply(&mut output, &mut flow, FlowEvent::Retake)?;
                } else if cmd == "cancel" {
                    apply(&mut output, &mut flow, FlowEvent::Cancel)?;
                } else if let Some(number) = cmd.strip_prefix("manual ") {
                    let generation = flow.generation();
                    let event = FlowEvent::ProductNumberReady {
                        generation,
                        product_number: number.trim().to_string(),
                    };
                    apply(&mut output, &mut flow, event)?;
                } else {
                    handle_selection(&mut output, &mut flow, ocr, &cmd)?;
                }
            }

            ScreenKind::DataInput => {
                let pending = match flow.screen() {
                    Screen::DataInput { product_number } => product_number.clone(),
                    _ => unreachable!("kind() said data input"),
                };
                let mut f = form
                    .take()
                    .unwrap_or_else(|| EntryForm::prefill(&pending));

                writeln!(output, "-- 제품 정보 입력 --")?;
                prompt_form_fields(&mut input, &mut output, store, &mut f)?;

                writeln!(
                    output,
                    "[s] save  [m] capture more  [l] view list  [c] cancel"
                )?;
                let Some(cmd) = read_line(&mut input)? else {
                    break;
                };
                match cmd.as_str() {
                    "s" => match f.submit(store) {
                        Ok(record) => {
                            writeln!(output, "저장 완료: {}", record.product_number)?;
                            apply(&mut output, &mut flow, FlowEvent::Saved)?;
                        }
                        Err(e) => {
                            writeln!(output, "{}", e)?;
                            form = Some(f);
                        }
                    },
                    "m" => apply(&mut output, &mut flow, FlowEvent::BeginCapture)?,
                    "l" => apply(&mut output, &mut flow, FlowEvent::ViewList)?,
                    "c" => apply(&mut output, &mut flow, FlowEvent::Cancel)?,
                    other => {
                        writeln!(output, "Unknown choice: {}", other)?;
                        form = Some(f);
                    }
                }
            }

            ScreenKind::List => {
                let records = match store.inventory() {
                    Ok(records) => records,
                    Err(e) => {
                        writeln!(output, "{}", e)?;
                        apply(&mut output, &mut flow, FlowEvent::Cancel)?;
                        continue;
                    }
                };
                writeln!(output, "-- 재고 목록 ({}) --", records.len())?;
                print_records(&mut output, records.iter())?;
                writeln!(
                    output,
                    "'delete <id>', 'clear', 'export', 'export txt', 'search <text>', 'add' or 'back':"
                )?;
                let Some(cmd) = read_line(&mut input)? else {
                    break;
                };
                handle_list_command(&mut output, &mut flow, store, &records, &cmd)?;
            }
        }
    }

    Ok(())
}

fn apply<W: Write>(output: &mut W, flow: &mut ScreenFlow, event: FlowEvent) -> Result<()> {
    if let Err(e) = flow.apply(event) {
        writeln!(output, "{}", e)?;
    }
    Ok(())
}

fn handle_selection<W: Write>(
    output: &mut W,
    flow: &mut ScreenFlow,
    ocr: Option<&OcrSession>,
    cmd: &str,
) -> Result<()> {
    let coords: Vec<f32> = cmd
        .split_whitespace()
        .filter_map(|part| part.parse().ok())
        .collect();
    let &[x0, y0, x1, y1] = coords.as_slice() else {
        writeln!(output, "Expected four numbers, e.g. '50 50 150 90'")?;
        return Ok(());
    };

    let Screen::Preview { image } = flow.screen() else {
        return Ok(());
    };

    // The terminal shows the image at its native size, so the display
    // viewport matches the image dimensions one to one.
    let (width, height) = image.dimensions();
    let viewport = Viewport::new(width as f32, height as f32, image);
    let mut selection = DragSelection::new();
    selection.press(&viewport, x0, y0);
    selection.drag(&viewport, x1, y1);
    if let Some((sx, sy, sw, sh)) = selection.current() {
        writeln!(output, "Selection: {:.0},{:.0} {:.0}x{:.0}", sx, sy, sw, sh)?;
    }

    let Some(rect) = selection.release() else {
        crate::log("Selection below the minimum size, ignored");
        return Ok(());
    };

    let Some(session) = ocr else {
        writeln!(
            output,
            "Recognition engine unavailable; use 'manual <number>'."
        )?;
        return Ok(());
    };

    let generation = flow.generation();
    match session.recognize(image, &rect, generation) {
        Ok(outcome) if outcome.is_accepted() => {
            writeln!(output, "인식된 품번: {}", outcome.product_number)?;
            let event = FlowEvent::ProductNumberReady {
                generation: outcome.generation,
                product_number: outcome.product_number,
            };
            apply(output, flow, event)?;
        }
        Ok(_) => writeln!(output, "품번 인식 실패. Select again.")?,
        Err(e) => writeln!(output, "Recognition failed: {:#}", e)?,
    }
    Ok(())
}

fn prompt_form_fields<R: BufRead, W: Write>(
    input: &mut R,
    output: &mut W,
    store: &mut dyn RecordStore,
    form: &mut EntryForm,
) -> Result<()> {
    match store.packaging_units() {
        Ok(units) => {
            let names: Vec<_> = units.iter().map(|u| u.name.as_str()).collect();
            writeln!(output, "포장단위: {}", names.join(", "))?;
        }
        Err(e) => writeln!(output, "{}", e)?,
    }

    for (label, current) in [
        ("품번", form.product_number.clone()),
        ("포장단위", form.packaging_unit.clone()),
        ("수량", form.quantity.clone()),
        ("유통기한 (YYYYMMDD, optional)", form.expiration_date.clone()),
    ] {
        writeln!(output, "{} [{}]:", label, current)?;
        let Some(value) = read_line(input)? else {
            return Ok(());
        };
        if value.is_empty() {
            continue;
        }
        match label {
            "품번" => form.product_number = value,
            "포장단위" => form.packaging_unit = value,
            "수량" => form.quantity = value,
            _ => form.set_expiration_date(&value),
        }
    }
    Ok(())
}

fn print_records<'a, W: Write>(
    output: &mut W,
    records: impl Iterator<Item = &'a InventoryRecord>,
) -> Result<()> {
    for record in records {
        writeln!(
            output,
            "[{}] {} | {} | {} | {}",
            record.id,
            record.product_number,
            record.quantity,
            record.packaging_unit,
            record.expiration_date.as_deref().unwrap_or("-")
        )?;
    }
    Ok(())
}

fn handle_list_command<W: Write>(
    output: &mut W,
    flow: &mut ScreenFlow,
    store: &mut dyn RecordStore,
    records: &[InventoryRecord],
    cmd: &str,
) -> Result<()> {
    if cmd == "back" {
        apply(output, flow, FlowEvent::Cancel)?;
    } else if cmd == "add" {
        apply(output, flow, FlowEvent::BeginCapture)?;
    } else if cmd == "clear" {
        match store.clear_inventory() {
            Ok(()) => writeln!(output, "전체 삭제 완료")?,
            Err(e) => writeln!(output, "{}", e)?,
        }
    } else if cmd == "export" {
        match crate::export::write_csv(&crate::paths::get_exports_dir(), records) {
            Ok(path) => writeln!(output, "내보내기 완료: {}", path.display())?,
            Err(e) => writeln!(output, "{:#}", e)?,
        }
    } else if cmd == "export txt" {
        match crate::export::write_table(&crate::paths::get_exports_dir(), records) {
            Ok(path) => writeln!(output, "내보내기 완료: {}", path.display())?,
            Err(e) => writeln!(output, "{:#}", e)?,
        }
    } else if let Some(id) = cmd.strip_prefix("delete ") {
        match id.trim().parse::<i64>() {
            Ok(id) => match store.delete_inventory(id) {
                Ok(()) => writeln!(output, "삭제 완료")?,
                Err(e) => writeln!(output, "{}", e)?,
            },
            Err(_) => writeln!(output, "Expected a numeric id")?,
        }
    } else if let Some(query) = cmd.strip_prefix("search ") {
        let matches = filter_by_product_number(records, query);
        writeln!(output, "{} match(es)", matches.len())?;
        print_records(output, matches.into_iter())?;
    } else if !cmd.is_empty() {
        writeln!(output, "Unknown command: {}", cmd)?;
    }
    Ok(())
}

fn units_modal<R: BufRead, W: Write>(
    input: &mut R,
    output: &mut W,
    store: &mut dyn RecordStore,
) -> Result<()> {
    loop {
        match store.packaging_units() {
            Ok(units) => {
                writeln!(output, "-- 포장단위 설정 --")?;
                for unit in &units {
                    writeln!(output, "[{}] {}", unit.id, unit.name)?;
                }
            }
            Err(e) => writeln!(output, "{}", e)?,
        }
        writeln!(output, "'add <name>', 'del <id>' or 'close':")?;
        let Some(cmd) = read_line(input)? else {
            return Ok(());
        };
        if cmd == "close" {
            return Ok(());
        } else if let Some(name) = cmd.strip_prefix("add ") {
            match store.add_packaging_unit(name) {
                Ok(unit) => writeln!(output, "추가 완료: {}", unit.name)?,
                Err(e) => writeln!(output, "{}", e)?,
            }
        } else if let Some(id) = cmd.strip_prefix("del ") {
            match id.trim().parse::<i64>() {
                Ok(id) => match store.delete_packaging_unit(id) {
                    Ok(()) => writeln!(output, "삭제 완료")?,
                    Err(e) => writeln!(output, "{}", e)?,
                },
                Err(_) => writeln!(output, "Expected a numeric id")?,
            }
        } else if !cmd.is_empty() {
            writeln!(output, "Unknown command: {}", cmd)?;
        }
    }
}
